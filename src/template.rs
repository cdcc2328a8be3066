//! Bracketed placeholder templates such as `id=[Id]&subject=[Subject.Guid]`.
//!
//! Templates are parsed once when a column is resolved. Placeholder names
//! without a dot are matched against the schema at that point; dotted paths
//! are looked up in the row as written. At render time every placeholder is
//! replaced by the row value, or by nothing when the row lacks it.

use std::sync::OnceLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::{
    data::{Row, display_value, lookup_path},
    resolver::FieldResolver,
};

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

/// Characters `encodeURIComponent` leaves alone stay unescaped here too.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("placeholder pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// Values are percent-encoded, for query strings.
    Url,
    /// Values are inserted as plain text, for tooltips.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTemplate {
    source: String,
    escaping: Escaping,
    segments: Vec<Segment>,
}

impl ParamTemplate {
    pub fn parse(source: &str, escaping: Escaping, resolver: Option<&FieldResolver>) -> Self {
        let pattern = placeholder_pattern();
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in pattern.captures_iter(source) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            let raw = name.as_str().trim();
            let path = match resolver {
                Some(resolver) if !raw.contains('.') => resolver.resolve(raw),
                _ => raw.to_string(),
            };
            segments.push(Segment::Placeholder { path });
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        ParamTemplate {
            source: source.to_string(),
            escaping,
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn escaping(&self) -> Escaping {
        self.escaping
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Field paths referenced by the template, after schema matching.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { path } => Some(path.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, row: &Row) -> String {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder { path } => {
                    let value = lookup_path(row, path).map(placeholder_text).unwrap_or_default();
                    match self.escaping {
                        Escaping::Url => {
                            output.extend(utf8_percent_encode(&value, URI_COMPONENT));
                        }
                        Escaping::None => output.push_str(&value),
                    }
                }
            }
        }
        output
    }
}

fn placeholder_text(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => display_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaField, ValueType};
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn url_escapes_like_encode_uri_component() {
        let template = ParamTemplate::parse("q=[Q]", Escaping::Url, None);
        let data = row(json!({"Q": "a b&c/d?(x)*'!~"}));
        assert_eq!(template.render(&data), "q=a%20b%26c%2Fd%3F(x)*'!~");
    }

    #[test]
    fn missing_and_null_values_render_empty() {
        let template = ParamTemplate::parse("a=[A]&b=[B]", Escaping::Url, None);
        assert_eq!(template.render(&row(json!({"A": null}))), "a=&b=");
    }

    #[test]
    fn placeholders_match_schema_keys_case_insensitively() {
        let schema = Schema::new(vec![SchemaField::new("EntityId", ValueType::Integer)]);
        let resolver = FieldResolver::for_schema(&schema);
        let template = ParamTemplate::parse("id=[entityid]", Escaping::Url, Some(&resolver));
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["EntityId"]);
        assert_eq!(template.render(&row(json!({"EntityId": 42}))), "id=42");
    }

    #[test]
    fn dotted_paths_and_objects() {
        let template = ParamTemplate::parse("[Subject.Guid]|[Subject]", Escaping::None, None);
        let data = row(json!({"subject": {"guid": "g-1"}}));
        assert_eq!(template.render(&data), r#"g-1|{"guid":"g-1"}"#);
    }

    #[test]
    fn text_without_placeholders_is_kept() {
        let template = ParamTemplate::parse("static [unclosed", Escaping::None, None);
        assert_eq!(template.render(&Row::new()), "static [unclosed");
    }
}
