//! Content-type schema model, JSON loading, and field classification.
//!
//! This module owns the [`Schema`] struct (the read-only description of a
//! content type as published by the host), the [`ValueType`] and
//! [`FieldFormat`] enums, and [`SchemaField`] per-property metadata.
//!
//! ## Responsibilities
//!
//! - Parsing the host's JSON schema document (`properties` + `required`)
//!   while keeping the document's property order
//! - Degrading unknown declared types to `string` instead of rejecting them
//! - Capturing the item shape of array properties
//! - The group/relation field heuristic ([`is_group_field`])

use std::{collections::HashMap, fmt, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::io_utils;

const GROUP_MARKER: &str = "group";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ValueType {
    /// Maps a declared JSON schema `type`; anything unknown is treated as a string.
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_lowercase().as_str() {
            "integer" => ValueType::Integer,
            "number" => ValueType::Number,
            "boolean" => ValueType::Boolean,
            "object" => ValueType::Object,
            "array" => ValueType::Array,
            _ => ValueType::String,
        }
    }

    pub fn is_structured(self) -> bool {
        matches!(self, ValueType::Object | ValueType::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Array => "array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldFormat {
    Date,
    DateTime,
    Uri,
    Email,
    Group,
    Other(String),
}

impl FieldFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let format = match trimmed.to_ascii_lowercase().as_str() {
            "date" => FieldFormat::Date,
            "date-time" => FieldFormat::DateTime,
            "uri" => FieldFormat::Uri,
            "email" => FieldFormat::Email,
            "group" => FieldFormat::Group,
            _ => FieldFormat::Other(trimmed.to_string()),
        };
        Some(format)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldFormat::Date => "date",
            FieldFormat::DateTime => "date-time",
            FieldFormat::Uri => "uri",
            FieldFormat::Email => "email",
            FieldFormat::Group => "group",
            FieldFormat::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property of a content type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub key: String,
    pub title: String,
    pub value_type: ValueType,
    pub format: Option<FieldFormat>,
    pub input_hint: Option<String>,
    pub description: Option<String>,
    /// Property keys exposed by the `items` shape of an array field.
    pub item_properties: Vec<String>,
    /// Explicit opt-out from `radmin.excludeFromTable` (or `x-table.excludeFromTable`).
    pub exclude_from_table: bool,
}

impl SchemaField {
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        let key = key.into();
        SchemaField {
            title: key.clone(),
            key,
            value_type,
            format: None,
            input_hint: None,
            description: None,
            item_properties: Vec::new(),
            exclude_from_table: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = FieldFormat::parse(format);
        self
    }

    pub fn with_input_hint(mut self, hint: impl Into<String>) -> Self {
        self.input_hint = Some(hint.into());
        self
    }

    pub fn with_item_properties<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_properties = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluded(mut self) -> Self {
        self.exclude_from_table = true;
        self
    }

    pub fn has_format(&self, format: &FieldFormat) -> bool {
        self.format.as_ref() == Some(format)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub required: Vec<String>,
    fields: Vec<SchemaField>,
    positions: HashMap<String, usize>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        let mut schema = Schema::default();
        for field in fields {
            schema.push(field);
        }
        schema
    }

    /// Appends a field; a later field with an existing key replaces the earlier one in place.
    pub fn push(&mut self, field: SchemaField) {
        if let Some(&idx) = self.positions.get(&field.key) {
            self.fields[idx] = field;
        } else {
            self.positions.insert(field.key.clone(), self.fields.len());
            self.fields.push(field);
        }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.positions.get(key).map(|&idx| &self.fields[idx])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(input).context("Parsing schema JSON")?;
        Ok(raw.into_schema())
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawSchema = serde_json::from_value(value).context("Parsing schema JSON")?;
        Ok(raw.into_schema())
    }

    /// Reads a schema file (`-` for stdin); YAML is accepted by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawSchema = io_utils::load_document(path)?;
        Ok(raw.into_schema())
    }
}

/// Group/relation fields are not displayable as flat columns.
///
/// A field counts as grouped when any rule holds: it carries the explicit
/// exclude flag, its format is literally `group`, its key or title contains
/// `group` (case-insensitive), or it is an array whose items expose a
/// `Title`/`title` property. The rules are a heuristic and can misclassify.
pub fn is_group_field(field: &SchemaField) -> bool {
    if field.exclude_from_table {
        return true;
    }
    if field.has_format(&FieldFormat::Group) {
        return true;
    }
    if field.key.to_lowercase().contains(GROUP_MARKER)
        || field.title.to_lowercase().contains(GROUP_MARKER)
    {
        return true;
    }
    field.value_type == ValueType::Array
        && field
            .item_properties
            .iter()
            .any(|key| key == "Title" || key == "title")
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(rename = "$id", default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    required: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperty {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "type", default)]
    value_type: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(rename = "inputType", default)]
    input_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    radmin: TableHints,
    #[serde(rename = "x-table", default)]
    table_hints: TableHints,
}

#[derive(Debug, Default, Deserialize)]
struct TableHints {
    #[serde(rename = "excludeFromTable", default)]
    exclude_from_table: bool,
}

impl RawSchema {
    fn into_schema(self) -> Schema {
        let mut schema = Schema {
            id: self.id,
            title: self.title,
            description: self.description,
            required: self.required,
            ..Schema::default()
        };
        for (key, value) in self.properties {
            // A malformed property still yields a string column rather than failing the schema.
            let raw = match value {
                Value::String(declared) => RawProperty {
                    value_type: Some(declared),
                    ..RawProperty::default()
                },
                other => serde_json::from_value(other).unwrap_or_default(),
            };
            schema.push(raw.into_field(key));
        }
        schema
    }
}

impl RawProperty {
    fn into_field(self, key: String) -> SchemaField {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| key.clone());
        // Items are either a full schema (`items.properties`) or a bare key map without `type`.
        let item_properties = self
            .items
            .as_ref()
            .and_then(Value::as_object)
            .map(|items| match items.get("properties").and_then(Value::as_object) {
                Some(props) => props.keys().cloned().collect(),
                None if !items.contains_key("type") => items.keys().cloned().collect(),
                None => Vec::new(),
            })
            .unwrap_or_default();
        SchemaField {
            value_type: self
                .value_type
                .as_deref()
                .map(ValueType::from_declared)
                .unwrap_or_default(),
            format: self.format.as_deref().and_then(FieldFormat::parse),
            input_hint: self.input_type.filter(|s| !s.trim().is_empty()),
            description: self.description,
            item_properties,
            exclude_from_table: self.radmin.exclude_from_table
                || self.table_hints.exclude_from_table,
            title,
            key,
        }
    }
}
