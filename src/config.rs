//! Editor-authored table and column configuration.
//!
//! The host publishes these as JSON (or YAML when exported by hand). Field
//! names follow the host's camelCase convention; aliases accept the older
//! names still found in stored configurations (`valueSelector`,
//! `columnConfigs`, `pagingMode`, ...).

use std::{fmt, path::Path};

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use crate::{formats::Alignment, io_utils};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Identity of one configured table; keys per-instance customizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct TableId(pub Uuid);

impl TableId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_matches(|c| matches!(c, '{' | '}'));
        Uuid::parse_str(trimmed).ok().map(TableId)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Empty or malformed ids collapse to the nil id instead of rejecting the table.
impl<'de> Deserialize<'de> for TableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(TableId::parse).unwrap_or_default())
    }
}

impl From<Uuid> for TableId {
    fn from(value: Uuid) -> Self {
        TableId(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthMode {
    #[default]
    Automatic,
    Fixed(u32),
}

impl WidthMode {
    pub fn fixed(self) -> Option<u32> {
        match self {
            WidthMode::Fixed(px) => Some(px),
            WidthMode::Automatic => None,
        }
    }
}

impl Serialize for WidthMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WidthMode::Automatic => serializer.serialize_str("automatic"),
            WidthMode::Fixed(px) => serializer.serialize_u32(*px),
        }
    }
}

impl<'de> Deserialize<'de> for WidthMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawWidth {
            Pixels(u32),
            Float(f64),
            Text(String),
            Other(de::IgnoredAny),
        }
        let mode = match Option::<RawWidth>::deserialize(deserializer)? {
            None => WidthMode::Automatic,
            Some(RawWidth::Pixels(px)) => WidthMode::Fixed(px),
            Some(RawWidth::Float(px)) if px.is_finite() && px > 0.0 => {
                WidthMode::Fixed(px.round() as u32)
            }
            Some(RawWidth::Float(_)) => WidthMode::Automatic,
            Some(RawWidth::Text(text)) => {
                let trimmed = text.trim().trim_end_matches("px").trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("automatic") {
                    WidthMode::Automatic
                } else {
                    trimmed.parse::<u32>().map(WidthMode::Fixed).unwrap_or_else(|_| {
                        warn!("Ignoring unparseable column width '{text}'");
                        WidthMode::Automatic
                    })
                }
            }
            Some(RawWidth::Other(_)) => {
                warn!("Ignoring non-text column width");
                WidthMode::Automatic
            }
        };
        Ok(mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    #[default]
    Automatic,
    Left,
    Center,
    Right,
}

impl AlignmentMode {
    pub fn explicit(self) -> Option<Alignment> {
        match self {
            AlignmentMode::Automatic => None,
            AlignmentMode::Left => Some(Alignment::Left),
            AlignmentMode::Center => Some(Alignment::Center),
            AlignmentMode::Right => Some(Alignment::Right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    #[serde(alias = "valueSelector", alias = "fieldRef")]
    pub field: String,
    #[serde(default)]
    pub title: String,
    /// Explicit render format; empty means "infer from schema".
    #[serde(default, alias = "valueFormat")]
    pub format: String,
    #[serde(default)]
    pub width: WidthMode,
    #[serde(default, alias = "horizontalAlignment")]
    pub alignment: AlignmentMode,
    #[serde(default, alias = "linkEnable")]
    pub link_enabled: bool,
    #[serde(default, deserialize_with = "string_or_number")]
    pub link_view_id: String,
    #[serde(default)]
    pub link_parameters: String,
    #[serde(default)]
    pub tooltip_enabled: bool,
    #[serde(default, alias = "tooltipSelector")]
    pub tooltip_template: String,
}

impl ColumnConfig {
    pub fn new(field: impl Into<String>) -> Self {
        ColumnConfig {
            field: field.into(),
            ..ColumnConfig::default()
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_link(mut self, view_id: impl Into<String>, parameters: impl Into<String>) -> Self {
        self.link_enabled = true;
        self.link_view_id = view_id.into();
        self.link_parameters = parameters.into();
        self
    }

    pub fn with_tooltip(mut self, template: impl Into<String>) -> Self {
        self.tooltip_enabled = true;
        self.tooltip_template = template.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default)]
    pub guid: TableId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data_content_type: String,
    #[serde(default, alias = "columnConfigs", alias = "dataViewColumnConfig")]
    pub columns: Vec<ColumnConfig>,
    #[serde(default, alias = "autoFillRemaining")]
    pub columns_auto_show_remaining: bool,
    #[serde(default)]
    pub column_sort: Option<String>,
    #[serde(default)]
    pub sort_order_reverse: bool,
    #[serde(default, alias = "pagingMode", deserialize_with = "flexible_bool")]
    pub pagination: bool,
    #[serde(default = "default_page_size", alias = "pagingSize")]
    pub page_size: usize,
    #[serde(default, alias = "search")]
    pub search_enabled: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            guid: TableId::default(),
            title: String::new(),
            data_content_type: String::new(),
            columns: Vec::new(),
            columns_auto_show_remaining: false,
            column_sort: None,
            sort_order_reverse: false,
            pagination: false,
            page_size: DEFAULT_PAGE_SIZE,
            search_enabled: false,
        }
    }
}

impl TableConfig {
    pub fn load(path: &Path) -> Result<Self> {
        io_utils::load_document(path)
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Accepts booleans and the host's stringly `"true"`/`"false"` paging flags.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Text(String),
    }
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(flag)) => flag,
        Some(RawFlag::Text(text)) => text.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
        View {
            #[serde(rename = "viewId")]
            view_id: Box<RawId>,
        },
    }
    fn flatten(raw: RawId) -> String {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
            RawId::View { view_id } => flatten(*view_id),
        }
    }
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(flatten)
        .unwrap_or_default())
}
