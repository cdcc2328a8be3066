//! Column resolution: editor column configs + schema → render-ready columns.
//!
//! [`resolve_columns`] never fails. A reference that matches no schema field
//! keeps its cleaned text as the field key and renders as a plain column;
//! group/relation fields are dropped because their values are not flat.

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{
    config::ColumnConfig,
    data::{Row, display_value, lookup_path},
    formats::{Alignment, RenderFormat, map_format},
    formatter::{BuiltinFormatter, Formatter, Sorter},
    html::indicates_rich_text,
    resolver::FieldResolver,
    schema::{Schema, SchemaField, is_group_field},
    template::{Escaping, ParamTemplate},
};

pub const LINK_TARGET: &str = "_self";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Tooltip {
    #[default]
    Disabled,
    /// Show the cell's own value.
    RawValue,
    Template(ParamTemplate),
}

impl Tooltip {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Tooltip::Disabled)
    }

    pub fn text(&self, value: &Value, row: &Row) -> Option<String> {
        match self {
            Tooltip::Disabled => None,
            Tooltip::RawValue => Some(display_value(value)),
            Tooltip::Template(template) => Some(template.render(row)),
        }
    }
}

/// Builds the detail-view URL for a row: `?viewid=<id>&<parameters>`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkResolver {
    pub view_id: String,
    pub parameters: ParamTemplate,
}

impl LinkResolver {
    pub fn new(view_id: &str, parameters: &str, resolver: &FieldResolver) -> Self {
        LinkResolver {
            view_id: view_id.trim().to_string(),
            parameters: ParamTemplate::parse(parameters, Escaping::Url, Some(resolver)),
        }
    }

    pub fn url(&self, row: &Row) -> String {
        let params = self.parameters.render(row);
        if params.is_empty() {
            format!("?viewid={}", self.view_id)
        } else {
            format!("?viewid={}&{params}", self.view_id)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub field_key: String,
    pub title: String,
    pub render_format: RenderFormat,
    pub alignment: Option<Alignment>,
    pub header_alignment: Option<Alignment>,
    pub width: Option<u32>,
    pub formatter: Option<Formatter>,
    pub formatter_params: Map<String, Value>,
    pub tooltip: Tooltip,
    pub link: Option<LinkResolver>,
    pub sorter: Option<Sorter>,
    /// Appended by auto-fill rather than configured by the editor.
    pub auto_generated: bool,
}

impl ResolvedColumn {
    fn with_format(field_key: String, title: String, render_format: RenderFormat) -> Self {
        let defaults = render_format.defaults();
        ResolvedColumn {
            field_key,
            title,
            render_format,
            alignment: defaults.alignment,
            header_alignment: None,
            width: None,
            formatter: defaults.formatter.map(Formatter::Builtin),
            formatter_params: defaults
                .formatter
                .map(BuiltinFormatter::default_params)
                .unwrap_or_default(),
            tooltip: Tooltip::Disabled,
            link: None,
            sorter: defaults.sorter,
            auto_generated: false,
        }
    }

    fn set_formatter(&mut self, formatter: BuiltinFormatter) {
        self.formatter = Some(Formatter::Builtin(formatter));
        self.formatter_params = formatter.default_params();
    }

    /// The row value this column displays (`null` when absent).
    pub fn value<'a>(&self, row: &'a Row) -> &'a Value {
        lookup_path(row, &self.field_key).unwrap_or(&Value::Null)
    }

    pub fn format_cell(&self, row: &Row) -> String {
        let value = self.value(row);
        match &self.formatter {
            Some(formatter) => formatter.format(value, row),
            None => display_value(value),
        }
    }
}

/// Related values render as their first item's title and sort by it.
fn apply_structured_defaults(column: &mut ResolvedColumn, field: Option<&SchemaField>) {
    if field.is_some_and(|f| f.value_type.is_structured()) {
        column.set_formatter(BuiltinFormatter::GroupedTitle);
        column.sorter = Some(Sorter::Grouped);
    }
}

fn render_format_for(config: &ColumnConfig, field: Option<&SchemaField>) -> RenderFormat {
    let inferred = || field.map(map_format).unwrap_or(RenderFormat::Plain);
    let explicit = config.format.trim();
    if explicit.is_empty() {
        return inferred();
    }
    RenderFormat::from_name(explicit).unwrap_or_else(|| {
        warn!(
            "Column '{}' names unknown format '{explicit}', inferring from schema",
            config.field
        );
        inferred()
    })
}

fn resolve_configured(
    config: &ColumnConfig,
    field_key: String,
    field: Option<&SchemaField>,
    resolver: &FieldResolver,
) -> ResolvedColumn {
    let title = Some(config.title.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| field.map(|f| f.title.clone()))
        .unwrap_or_else(|| field_key.clone());
    let render_format = render_format_for(config, field);
    let mut column = ResolvedColumn::with_format(field_key, title, render_format);

    if let Some(alignment) = config.alignment.explicit() {
        column.alignment = Some(alignment);
        column.header_alignment = Some(alignment);
    }
    column.width = config.width.fixed();

    if config.link_enabled {
        column.set_formatter(BuiltinFormatter::Link);
        column.link = Some(LinkResolver::new(
            &config.link_view_id,
            &config.link_parameters,
            resolver,
        ));
        if field.is_some_and(|f| f.value_type.is_structured()) {
            // The link formatter flattens the value to text.
            column.sorter = Some(Sorter::String);
        }
    } else {
        apply_structured_defaults(&mut column, field);
    }

    column.tooltip = if !config.tooltip_enabled {
        Tooltip::Disabled
    } else if config.tooltip_template.trim().is_empty() {
        Tooltip::RawValue
    } else {
        Tooltip::Template(ParamTemplate::parse(
            &config.tooltip_template,
            Escaping::None,
            Some(resolver),
        ))
    };

    if column.formatter.is_none() && field.is_some_and(indicates_rich_text) {
        column.set_formatter(BuiltinFormatter::PlainText);
    }
    column
}

fn auto_column(field: &SchemaField) -> ResolvedColumn {
    let mut column =
        ResolvedColumn::with_format(field.key.clone(), field.title.clone(), map_format(field));
    apply_structured_defaults(&mut column, Some(field));
    column.auto_generated = true;
    column
}

pub fn resolve_columns(
    configs: &[ColumnConfig],
    auto_fill_remaining: bool,
    schema: &Schema,
) -> Vec<ResolvedColumn> {
    let resolver = FieldResolver::for_schema(schema);
    let mut covered = HashSet::new();
    let mut columns = Vec::with_capacity(configs.len());

    for config in configs {
        if config.field.trim().is_empty() {
            warn!("Skipping column '{}' without a field reference", config.title);
            continue;
        }
        let field_key = resolver.resolve(&config.field);
        let field = schema.field(&field_key);
        covered.insert(field_key.clone());
        if field.is_some_and(is_group_field) {
            debug!("Dropping grouped field '{field_key}' from configured columns");
            continue;
        }
        columns.push(resolve_configured(config, field_key, field, &resolver));
    }

    if auto_fill_remaining {
        let before = columns.len();
        columns.extend(
            schema
                .fields()
                .iter()
                .filter(|f| !covered.contains(&f.key) && !is_group_field(f))
                .map(auto_column),
        );
        debug!("Auto-filled {} remaining column(s)", columns.len() - before);
    }
    columns
}
