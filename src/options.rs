//! Grid render options built from a resolved table.
//!
//! One [`ColumnDescriptor`] per resolved column, in the grid's camelCase
//! option shape. Descriptors keep the executable formatter and link so the
//! preview formats cells exactly as the grid would.

use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::{
    assembly::ResolvedTable,
    columns::{LINK_TARGET, LinkResolver, ResolvedColumn, Tooltip},
    data::{Row, display_value, lookup_path},
    formats::Alignment,
    formatter::{Formatter, Sorter},
    sort::SortDirective,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    FitData,
    #[default]
    FitDataFill,
    FitDataStretch,
    FitDataTable,
    FitColumns,
}

fn serialize_tooltip<S: Serializer>(tooltip: &Tooltip, serializer: S) -> Result<S::Ok, S::Error> {
    match tooltip {
        Tooltip::Disabled => serializer.serialize_bool(false),
        Tooltip::RawValue => serializer.serialize_bool(true),
        Tooltip::Template(template) => json!({ "template": template.source() }).serialize(serializer),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub title: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoz_align: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_hoz_align: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<Formatter>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub formatter_params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorter: Option<Sorter>,
    #[serde(serialize_with = "serialize_tooltip")]
    pub tooltip: Tooltip,
    #[serde(skip)]
    pub link: Option<LinkResolver>,
}

impl ColumnDescriptor {
    pub fn format_cell(&self, row: &Row) -> String {
        let value = lookup_path(row, &self.field).unwrap_or(&Value::Null);
        match &self.formatter {
            Some(formatter) => formatter.format(value, row),
            None => display_value(value),
        }
    }
}

impl From<&ResolvedColumn> for ColumnDescriptor {
    fn from(column: &ResolvedColumn) -> Self {
        let mut formatter_params = column.formatter_params.clone();
        if let Some(link) = &column.link {
            formatter_params.insert(
                "url".to_string(),
                json!({
                    "viewId": link.view_id,
                    "template": link.parameters.source(),
                }),
            );
            formatter_params.insert("target".to_string(), json!(LINK_TARGET));
        }
        ColumnDescriptor {
            title: column.title.clone(),
            field: column.field_key.clone(),
            hoz_align: column.alignment,
            header_hoz_align: column.header_alignment,
            width: column.width,
            formatter: column.formatter.clone(),
            formatter_params,
            sorter: column.sorter,
            tooltip: column.tooltip.clone(),
            link: column.link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub layout: Layout,
    pub columns: Vec<ColumnDescriptor>,
    pub pagination: bool,
    pub pagination_size: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub initial_sort: Vec<SortDirective>,
    /// Options customizers add that have no typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderOptions {
    pub fn build(table: &ResolvedTable) -> Self {
        let mut initial_sort = table.sort.clone();
        // Some grid back-ends apply multi-column sorts last-is-primary.
        if table.config.sort_order_reverse {
            initial_sort.reverse();
        }
        debug!(
            "Building render options for table {} with {} column(s)",
            table.id(),
            table.columns.len()
        );
        RenderOptions {
            layout: Layout::default(),
            columns: table.columns.iter().map(ColumnDescriptor::from).collect(),
            pagination: table.config.pagination,
            pagination_size: table.config.page_size,
            initial_sort,
            extra: Map::new(),
        }
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn column_mut(&mut self, field: &str) -> Option<&mut ColumnDescriptor> {
        self.columns.iter_mut().find(|c| c.field == field)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
