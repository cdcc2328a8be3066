//! Cell formatters and sorters referenced by resolved columns.
//!
//! The grid addresses both by name; [`Formatter::name`] and [`Sorter::name`]
//! are the names that land in the render options. Each variant also has an
//! executable form so the same column definition can format and order rows
//! outside the grid (the preview, tests).

use std::{cmp::Ordering, fmt, sync::Arc};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::{
    data::{Row, display_value, parse_temporal},
    html,
};

/// Input pattern the host uses for every temporal value.
pub const HOST_DATE_INPUT: &str = "yyyy-MM-dd'T'HH:mm:ss'Z'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePattern {
    Date,
    DateTime,
    Time,
}

impl DatePattern {
    /// Output pattern in the grid's (Luxon) token syntax.
    pub fn grid_output(self) -> &'static str {
        match self {
            DatePattern::Date => "dd/MM/yy",
            DatePattern::DateTime => "dd/MM/yy HH:mm:ss",
            DatePattern::Time => "HH:mm:ss",
        }
    }

    /// The same output pattern in chrono's strftime syntax.
    pub fn chrono_output(self) -> &'static str {
        match self {
            DatePattern::Date => "%d/%m/%y",
            DatePattern::DateTime => "%d/%m/%y %H:%M:%S",
            DatePattern::Time => "%H:%M:%S",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFormatter {
    TickCross,
    DateTime(DatePattern),
    Link,
    GroupedTitle,
    PlainText,
    Progress,
}

impl BuiltinFormatter {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinFormatter::TickCross => "tickCross",
            BuiltinFormatter::DateTime(_) => "datetime",
            BuiltinFormatter::Link => "link",
            BuiltinFormatter::GroupedTitle => "groupedTitle",
            BuiltinFormatter::PlainText => "plaintext",
            BuiltinFormatter::Progress => "progress",
        }
    }

    pub fn default_params(self) -> Map<String, Value> {
        let params = match self {
            BuiltinFormatter::DateTime(pattern) => json!({
                "inputFormat": HOST_DATE_INPUT,
                "outputFormat": pattern.grid_output(),
            }),
            BuiltinFormatter::Progress => json!({
                "min": 0,
                "max": 100,
                "color": ["#31B4E8"],
            }),
            _ => return Map::new(),
        };
        match params {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn format(self, value: &Value) -> String {
        match self {
            BuiltinFormatter::TickCross => match truthiness(value) {
                Some(true) => "\u{2714}".to_string(),
                Some(false) => "\u{2718}".to_string(),
                None => String::new(),
            },
            BuiltinFormatter::DateTime(pattern) => {
                let text = display_value(value);
                parse_temporal(&text)
                    .map(|parsed| parsed.format(pattern.chrono_output()).to_string())
                    .unwrap_or(text)
            }
            BuiltinFormatter::GroupedTitle => grouped_title(value, true),
            BuiltinFormatter::PlainText => html::value_to_plain_text(value),
            BuiltinFormatter::Progress => match value.as_f64().or_else(|| {
                value.as_str().and_then(|s| s.trim().parse::<f64>().ok())
            }) {
                Some(number) => format!("{}%", number.clamp(0.0, 100.0).round() as i64),
                None => display_value(value),
            },
            BuiltinFormatter::Link => display_value(value),
        }
    }
}

pub type FormatFn = dyn Fn(&Value, &Row) -> String + Send + Sync;

/// A formatter supplied at runtime, usually by a customizer.
#[derive(Clone)]
pub struct CustomFormatter {
    name: String,
    func: Arc<FormatFn>,
}

impl CustomFormatter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Row) -> String + Send + Sync + 'static,
    {
        CustomFormatter {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormatter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Formatter {
    Builtin(BuiltinFormatter),
    Custom(CustomFormatter),
}

impl Formatter {
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Row) -> String + Send + Sync + 'static,
    {
        Formatter::Custom(CustomFormatter::new(name, func))
    }

    pub fn name(&self) -> &str {
        match self {
            Formatter::Builtin(builtin) => builtin.name(),
            Formatter::Custom(custom) => custom.name(),
        }
    }

    pub fn builtin(&self) -> Option<BuiltinFormatter> {
        match self {
            Formatter::Builtin(builtin) => Some(*builtin),
            Formatter::Custom(_) => None,
        }
    }

    pub fn format(&self, value: &Value, row: &Row) -> String {
        match self {
            Formatter::Builtin(builtin) => builtin.format(value),
            Formatter::Custom(custom) => (custom.func)(value, row),
        }
    }
}

impl From<BuiltinFormatter> for Formatter {
    fn from(value: BuiltinFormatter) -> Self {
        Formatter::Builtin(value)
    }
}

impl PartialEq for Formatter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Formatter::Builtin(a), Formatter::Builtin(b)) => a == b,
            (Formatter::Custom(a), Formatter::Custom(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.func, &b.func)
            }
            _ => false,
        }
    }
}

impl Serialize for Formatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sorter {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    /// Orders related items by their derived display title.
    #[serde(rename = "object")]
    Grouped,
}

impl Sorter {
    pub fn name(self) -> &'static str {
        match self {
            Sorter::String => "string",
            Sorter::Number => "number",
            Sorter::Boolean => "boolean",
            Sorter::Grouped => "object",
        }
    }

    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            Sorter::String => compare_text(&display_value(a), &display_value(b)),
            Sorter::Number => compare_options(as_number(a), as_number(b), |x, y| x.total_cmp(&y)),
            Sorter::Boolean => compare_options(truthiness(a), truthiness(b), |x, y| x.cmp(&y)),
            Sorter::Grouped => compare_text(&grouped_title(a, false), &grouped_title(b, false)),
        }
    }
}

/// Ordering used when a column names no sorter: numbers numerically, everything else as text.
pub fn compare_auto(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => compare_text(&display_value(a), &display_value(b)),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Missing values sort first, mirroring how empty cells lead an ascending column.
fn compare_options<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "true" | "1" | "yes" | "y" => Some(true),
            _ => Some(false),
        },
        Value::Null => None,
        _ => Some(true),
    }
}

fn item_title(item: &Value) -> String {
    match item {
        Value::Object(map) => map
            .get("Title")
            .or_else(|| map.get("title"))
            .map(display_value)
            .unwrap_or_else(|| item.to_string()),
        other => display_value(other),
    }
}

/// Display title of a related value: the first item's title, optionally with a count suffix.
pub fn grouped_title(value: &Value, with_suffix: bool) -> String {
    match value {
        Value::Array(items) => match items.first() {
            None => String::new(),
            Some(first) => {
                let title = item_title(first);
                if with_suffix && items.len() > 1 {
                    format!("{title} +{} more", items.len() - 1)
                } else {
                    title
                }
            }
        },
        other => item_title(other),
    }
}
