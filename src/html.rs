//! Plain-text rendering for rich-text fields.
//!
//! Legacy content frequently stores markup either raw, entity-encoded
//! (`&lt;p&gt;`) or JS-escaped (`\u003cp\u003e`). Cells for such fields are
//! decoded first and then stripped of tags so markup never shows as text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::{
    data::display_value,
    schema::{FieldFormat, SchemaField},
};

static RICH_TEXT_MARKERS: OnceLock<Regex> = OnceLock::new();
static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
static HTML_HINT: OnceLock<Regex> = OnceLock::new();
static UNICODE_LT: OnceLock<Regex> = OnceLock::new();
static UNICODE_GT: OnceLock<Regex> = OnceLock::new();

fn rich_text_markers() -> &'static Regex {
    RICH_TEXT_MARKERS.get_or_init(|| {
        Regex::new(r"(?i)(wysiwyg|html|rich|editor|ckeditor|tinymce)")
            .expect("rich text marker pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| Regex::new(r"</?[^>]+(>|$)").expect("tag pattern is valid"))
}

fn html_hint() -> &'static Regex {
    HTML_HINT.get_or_init(|| {
        Regex::new(r"(?i)<[a-z][\s\S]*>|&lt;|\\u003c|\\u003e").expect("html hint pattern is valid")
    })
}

/// Whether any of the field's descriptors (input hint, format, description,
/// key or title) names a rich-text editor.
pub fn indicates_rich_text(field: &SchemaField) -> bool {
    let markers = rich_text_markers();
    [
        field.input_hint.as_deref(),
        field.format.as_ref().map(FieldFormat::as_str),
        field.description.as_deref(),
        Some(field.key.as_str()),
        Some(field.title.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|text| markers.is_match(text))
}

pub fn looks_like_html(text: &str) -> bool {
    html_hint().is_match(text)
}

/// Normalizes `<`/`>` escapes and decodes HTML entities.
pub fn decode_entities(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let lt = UNICODE_LT.get_or_init(|| Regex::new(r"(?i)\\u003c").expect("valid escape pattern"));
    let gt = UNICODE_GT.get_or_init(|| Regex::new(r"(?i)\\u003e").expect("valid escape pattern"));
    let normalized = lt.replace_all(input, "<");
    let normalized = gt.replace_all(&normalized, ">");
    html_escape::decode_html_entities(&normalized).into_owned()
}

pub fn strip_tags(html: &str) -> String {
    tag_pattern().replace_all(html, "").into_owned()
}

pub fn to_plain_text(text: &str) -> String {
    strip_tags(&decode_entities(text))
}

pub fn value_to_plain_text(value: &Value) -> String {
    to_plain_text(&display_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueType;

    #[test]
    fn decodes_entities_before_stripping() {
        assert_eq!(to_plain_text("&lt;p&gt;Hello &amp; bye&lt;/p&gt;"), "Hello & bye");
        assert_eq!(to_plain_text(r"\u003cb\u003eBold\u003c/b\u003e"), "Bold");
        assert_eq!(to_plain_text("<div class=\"x\">A<br/>B</div>"), "AB");
        assert_eq!(to_plain_text("plain"), "plain");
    }

    #[test]
    fn unterminated_tags_are_dropped() {
        assert_eq!(strip_tags("text <span"), "text ");
    }

    #[test]
    fn rich_text_detection_uses_hint_and_format() {
        let wysiwyg = SchemaField::new("Body", ValueType::String).with_input_hint("string-wysiwyg");
        assert!(indicates_rich_text(&wysiwyg));
        let html_format = SchemaField::new("Intro", ValueType::String).with_format("html");
        assert!(indicates_rich_text(&html_format));
        let plain = SchemaField::new("Name", ValueType::String).with_input_hint("string-default");
        assert!(!indicates_rich_text(&plain));
    }

    #[test]
    fn rich_text_detection_uses_description() {
        let mut field = SchemaField::new("Summary", ValueType::String);
        field.description = Some("Edited in CKEditor".to_string());
        assert!(indicates_rich_text(&field));
    }

    #[test]
    fn rich_text_detection_uses_key() {
        assert!(indicates_rich_text(&SchemaField::new("BodyHtml", ValueType::String)));
    }

    #[test]
    fn rich_text_detection_uses_title() {
        let field = SchemaField::new("Intro", ValueType::String).with_title("Intro (HTML)");
        assert!(indicates_rich_text(&field));
    }

    #[test]
    fn html_hint_detects_encoded_markup() {
        assert!(looks_like_html("<p>x</p>"));
        assert!(looks_like_html("&lt;p&gt;"));
        assert!(!looks_like_html("a < b"));
    }
}
