//! Compact sort expressions: `Title:desc,"Last, First":asc,CreatedOn`.
//!
//! Parsing is best-effort and total. Commas and colons inside a balanced
//! quote pair are literal; a quote without a matching close is ordinary
//! text. The directive list keeps the authored priority, index 0 primary.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    columns::ResolvedColumn,
    resolver::{FieldResolver, clean_reference},
    schema::Schema,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Anything starting with `d` or `-` is descending; everything else, empty included, ascending.
    pub fn from_token(token: &str) -> Self {
        match clean_reference(token).chars().next() {
            Some('d' | 'D' | '-') => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serializes in the grid's `{ column, dir }` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    #[serde(rename = "column")]
    pub field_key: String,
    #[serde(rename = "dir")]
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn new(field_key: impl Into<String>, direction: SortDirection) -> Self {
        SortDirective {
            field_key: field_key.into(),
            direction,
        }
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Splits `text` on `separator` outside balanced quotes, into at most `max_parts` pieces.
///
/// A quote only opens at the start of a piece, so apostrophes inside names stay literal.
fn split_unquoted(text: &str, separator: char, max_parts: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut open: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match open {
            Some(q) if c == q => open = None,
            Some(_) => {}
            None if is_quote(c)
                && text[start..i].trim().is_empty()
                && text[i + c.len_utf8()..].contains(c) =>
            {
                open = Some(c)
            }
            None if c == separator && parts.len() + 1 < max_parts => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Removes one quote pair when it spans the whole token.
fn unwrap_quoted(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if is_quote(first) && first == last => {
            let inner = &token[1..token.len() - 1];
            if inner.contains(first) { token } else { inner }
        }
        _ => token,
    }
}

/// Splits an expression into `field[:direction]` tokens.
///
/// A quote pair around the whole expression is dropped first, so
/// `"A:desc,B:asc"` reads like `A:desc,B:asc`.
pub fn tokenize(expression: &str) -> Vec<String> {
    let expression = unwrap_quoted(expression.trim());
    let tokens: Vec<&str> = split_unquoted(expression, ',', usize::MAX)
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    // `A:desc:B:asc` written without commas.
    if let [single] = tokens.as_slice()
        && !single.contains(is_quote)
    {
        let parts: Vec<&str> = single
            .split(':')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() > 2 && parts.len() % 2 == 0 {
            debug!("Rebuilding colon-only sort expression '{single}' into pairs");
            return parts
                .chunks(2)
                .map(|pair| format!("{}:{}", pair[0], pair[1]))
                .collect();
        }
    }
    tokens.into_iter().map(str::to_string).collect()
}

/// Splits one token into its raw name and direction text.
fn split_token(token: &str) -> (&str, &str) {
    let unwrapped = unwrap_quoted(token.trim());
    let mut parts = split_unquoted(unwrapped, ':', 2).into_iter();
    let name = parts.next().unwrap_or_default();
    let direction = parts.next().unwrap_or_default();
    (name, direction)
}

pub fn parse_sort(
    expression: &str,
    columns: &[ResolvedColumn],
    schema: &Schema,
) -> Vec<SortDirective> {
    if expression.trim().is_empty() {
        return Vec::new();
    }
    let resolver = FieldResolver::new()
        .with_columns(
            columns
                .iter()
                .map(|c| (c.field_key.as_str(), c.title.as_str())),
        )
        .with_schema(schema);

    let directives: Vec<SortDirective> = tokenize(expression)
        .iter()
        .filter_map(|token| {
            let (name, direction) = split_token(token);
            if clean_reference(name).is_empty() {
                debug!("Skipping sort token '{token}' without a field name");
                return None;
            }
            Some(SortDirective::new(
                resolver.resolve(name),
                SortDirection::from_token(direction),
            ))
        })
        .collect();
    debug!(
        "Parsed sort expression '{expression}' into {} directive(s)",
        directives.len()
    );
    directives
}
