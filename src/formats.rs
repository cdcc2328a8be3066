//! Schema type/format → render format mapping and per-format display defaults.
//!
//! The defaults live in one static table ([`FORMAT_DEFAULTS`]); adding a
//! format means adding a row, not another branch.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    formatter::{BuiltinFormatter, DatePattern, Sorter},
    schema::{FieldFormat, SchemaField, ValueType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderFormat {
    Plain,
    Number,
    Boolean,
    Date,
    DateTime,
    Time,
    Link,
    Grouped,
    Progress,
}

impl RenderFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderFormat::Plain => "string",
            RenderFormat::Number => "number",
            RenderFormat::Boolean => "boolean",
            RenderFormat::Date => "date",
            RenderFormat::DateTime => "date-time",
            RenderFormat::Time => "time",
            RenderFormat::Link => "link",
            RenderFormat::Grouped => "grouped",
            RenderFormat::Progress => "progress",
        }
    }

    /// Parses an explicit column override. Empty means "infer", unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "plain" => RenderFormat::Plain,
            "number" | "integer" => RenderFormat::Number,
            "boolean" => RenderFormat::Boolean,
            "date" => RenderFormat::Date,
            "date-time" | "datetime" => RenderFormat::DateTime,
            "time" => RenderFormat::Time,
            "link" | "uri" | "email" => RenderFormat::Link,
            "grouped" | "object" | "array" => RenderFormat::Grouped,
            "progress" => RenderFormat::Progress,
            _ => return None,
        };
        Some(format)
    }

    pub fn defaults(self) -> &'static FormatDefaults {
        FORMAT_DEFAULTS
            .iter()
            .find(|entry| entry.format == self)
            .unwrap_or(&FORMAT_DEFAULTS[0])
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDefaults {
    pub format: RenderFormat,
    pub alignment: Option<Alignment>,
    pub formatter: Option<BuiltinFormatter>,
    pub sorter: Option<Sorter>,
}

pub static FORMAT_DEFAULTS: &[FormatDefaults] = &[
    FormatDefaults {
        format: RenderFormat::Plain,
        alignment: None,
        formatter: None,
        sorter: None,
    },
    FormatDefaults {
        format: RenderFormat::Number,
        alignment: Some(Alignment::Right),
        formatter: None,
        sorter: Some(Sorter::Number),
    },
    FormatDefaults {
        format: RenderFormat::Boolean,
        alignment: Some(Alignment::Center),
        formatter: Some(BuiltinFormatter::TickCross),
        sorter: Some(Sorter::Boolean),
    },
    FormatDefaults {
        format: RenderFormat::Date,
        alignment: Some(Alignment::Right),
        formatter: Some(BuiltinFormatter::DateTime(DatePattern::Date)),
        sorter: None,
    },
    FormatDefaults {
        format: RenderFormat::DateTime,
        alignment: Some(Alignment::Right),
        formatter: Some(BuiltinFormatter::DateTime(DatePattern::DateTime)),
        sorter: None,
    },
    FormatDefaults {
        format: RenderFormat::Time,
        alignment: Some(Alignment::Right),
        formatter: Some(BuiltinFormatter::DateTime(DatePattern::Time)),
        sorter: None,
    },
    FormatDefaults {
        format: RenderFormat::Link,
        alignment: None,
        formatter: Some(BuiltinFormatter::Link),
        sorter: None,
    },
    FormatDefaults {
        format: RenderFormat::Grouped,
        alignment: None,
        formatter: Some(BuiltinFormatter::GroupedTitle),
        sorter: Some(Sorter::Grouped),
    },
    FormatDefaults {
        format: RenderFormat::Progress,
        alignment: None,
        formatter: Some(BuiltinFormatter::Progress),
        sorter: Some(Sorter::Number),
    },
];

pub fn map_format(field: &SchemaField) -> RenderFormat {
    let format = match &field.format {
        Some(FieldFormat::DateTime) => RenderFormat::DateTime,
        Some(FieldFormat::Date) => RenderFormat::Date,
        Some(FieldFormat::Uri | FieldFormat::Email) => RenderFormat::Link,
        _ => match field.value_type {
            ValueType::String => RenderFormat::Plain,
            ValueType::Integer | ValueType::Number => RenderFormat::Number,
            ValueType::Boolean => RenderFormat::Boolean,
            ValueType::Object | ValueType::Array => RenderFormat::Grouped,
        },
    };
    debug!(
        "Mapped field '{}' ({}{}) to format '{format}'",
        field.key,
        field.value_type,
        field
            .format
            .as_ref()
            .map(|f| format!("/{f}"))
            .unwrap_or_default()
    );
    format
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_has_exactly_one_defaults_row() {
        let all = [
            RenderFormat::Plain,
            RenderFormat::Number,
            RenderFormat::Boolean,
            RenderFormat::Date,
            RenderFormat::DateTime,
            RenderFormat::Time,
            RenderFormat::Link,
            RenderFormat::Grouped,
            RenderFormat::Progress,
        ];
        for format in all {
            let rows = FORMAT_DEFAULTS.iter().filter(|d| d.format == format).count();
            assert_eq!(rows, 1, "format {format} should have one defaults row");
        }
    }

    #[test]
    fn format_takes_priority_over_type() {
        let field = SchemaField::new("Due", ValueType::Integer).with_format("date-time");
        assert_eq!(map_format(&field), RenderFormat::DateTime);
        let mail = SchemaField::new("Mail", ValueType::String).with_format("email");
        assert_eq!(map_format(&mail), RenderFormat::Link);
        let other = SchemaField::new("Code", ValueType::Integer).with_format("color");
        assert_eq!(map_format(&other), RenderFormat::Number);
    }

    #[test]
    fn explicit_names_parse_case_insensitively() {
        assert_eq!(RenderFormat::from_name("Date-Time"), Some(RenderFormat::DateTime));
        assert_eq!(RenderFormat::from_name(" progress "), Some(RenderFormat::Progress));
        assert_eq!(RenderFormat::from_name("sparkline"), None);
    }

    #[test]
    fn boolean_defaults_are_centered_tick_cross() {
        let defaults = RenderFormat::Boolean.defaults();
        assert_eq!(defaults.alignment, Some(Alignment::Center));
        assert_eq!(defaults.formatter, Some(BuiltinFormatter::TickCross));
    }
}
