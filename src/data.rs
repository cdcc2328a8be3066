//! Row values as delivered by the host's data endpoint.
//!
//! Rows are plain JSON objects. Lookups are forgiving: keys match
//! case-insensitively and dotted paths descend into nested objects, because
//! authored templates rarely match the generated keys exactly.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

use crate::io_utils;

pub type Row = Map<String, Value>;

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses anything that looks like a point in time; bare dates land on midnight.
pub fn parse_temporal(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_naive_datetime(trimmed)
        .ok()
        .or_else(|| {
            parse_naive_date(trimmed)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Renders a JSON value as cell text. `null` becomes empty, strings stay unquoted.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Case-insensitive lookup of a single key; exact matches win.
pub fn lookup_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        let lowered = key.to_lowercase();
        object
            .iter()
            .find(|(k, _)| k.to_lowercase() == lowered)
            .map(|(_, v)| v)
    })
}

/// Resolves a dotted path such as `Subject.Guid`, descending through objects.
pub fn lookup_path<'a>(row: &'a Row, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if let Some(direct) = row.get(path) {
        return Some(direct);
    }
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = lookup_key(row, first.trim())?;
    for part in parts {
        current = match current {
            Value::Object(map) => lookup_key(map, part.trim())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Loads a JSON array of row objects, or an object wrapping them under `data`/`items`.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let value: Value = if io_utils::is_dash(path) {
        serde_json::from_reader(std::io::stdin().lock()).context("Parsing rows from stdin")?
    } else {
        let file = File::open(path).with_context(|| format!("Opening data file {path:?}"))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing rows from {path:?}"))?
    };
    rows_from_value(value)
}

pub fn rows_from_value(value: Value) -> Result<Vec<Row>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("items")) {
            Some(Value::Array(items)) => items,
            _ => return Err(anyhow!("Expected an array of rows or an object with 'data'")),
        },
        other => return Err(anyhow!("Expected an array of rows, found {other}")),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(anyhow!("Row {} is not an object: {other}", idx + 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
    }

    #[test]
    fn parse_naive_datetime_accepts_host_timestamps() {
        let expected =
            NaiveDateTime::parse_from_str("2024-05-06 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_naive_datetime("2024-05-06T14:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_naive_datetime("2024-05-06T16:30:00+02:00").unwrap(),
            expected
        );
        assert_eq!(parse_naive_datetime("2024-05-06 14:30").unwrap(), expected);
    }

    #[test]
    fn parse_temporal_promotes_dates_to_midnight() {
        let parsed = parse_temporal("2024-05-06").unwrap();
        assert_eq!(parsed.format("%H:%M").to_string(), "00:00");
        assert!(parse_temporal("soon").is_none());
        assert!(parse_temporal("  ").is_none());
    }

    #[test]
    fn lookup_path_is_case_insensitive_and_nested() {
        let data = row(json!({"Subject": {"Guid": "abc"}, "name": "x"}));
        assert_eq!(lookup_path(&data, "subject.guid"), Some(&json!("abc")));
        assert_eq!(lookup_path(&data, "Name"), Some(&json!("x")));
        assert_eq!(lookup_path(&data, "Subject.Missing"), None);
        assert_eq!(lookup_path(&data, "name.deeper"), None);
    }

    #[test]
    fn display_value_renders_scalars_plainly() {
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!("A B")), "A B");
        assert_eq!(display_value(&json!(7)), "7");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn rows_from_value_accepts_wrapped_arrays() {
        let rows = rows_from_value(json!({"data": [{"Id": 1}, {"Id": 2}]})).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows_from_value(json!([1, 2])).is_err());
        assert!(rows_from_value(json!("nope")).is_err());
    }
}
