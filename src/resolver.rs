//! Best-effort field name resolution.
//!
//! Authored references ("due date", "title") and machine keys (`DueDate`,
//! `Title`) usually differ only in casing or whitespace. [`FieldResolver`]
//! tries each candidate source in precedence order and, within a source, each
//! strategy in [`MATCH_ORDER`]; the first hit wins. When nothing matches the
//! cleaned input comes back unchanged, so a stale reference still renders.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    ExactKey,
    CaseInsensitiveKey,
    NormalizedTitle,
}

pub const MATCH_ORDER: [MatchStrategy; 3] = [
    MatchStrategy::ExactKey,
    MatchStrategy::CaseInsensitiveKey,
    MatchStrategy::NormalizedTitle,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    Columns,
    Schema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    /// `None` when the reference fell through to the verbatim fallback.
    pub matched_by: Option<(CandidateSource, MatchStrategy)>,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        self.matched_by.is_some()
    }
}

#[derive(Debug, Clone)]
struct LookupTable {
    source: CandidateSource,
    keys: HashSet<String>,
    by_lower_key: HashMap<String, String>,
    by_normalized_title: HashMap<String, String>,
}

impl LookupTable {
    fn new<'a, I>(source: CandidateSource, candidates: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = LookupTable {
            source,
            keys: HashSet::new(),
            by_lower_key: HashMap::new(),
            by_normalized_title: HashMap::new(),
        };
        for (key, title) in candidates {
            if key.is_empty() {
                continue;
            }
            table.keys.insert(key.to_string());
            table
                .by_lower_key
                .entry(key.to_lowercase())
                .or_insert_with(|| key.to_string());
            let normalized = normalize_title(title);
            if !normalized.is_empty() {
                table
                    .by_normalized_title
                    .entry(normalized)
                    .or_insert_with(|| key.to_string());
            }
        }
        table
    }

    fn find(&self, strategy: MatchStrategy, cleaned: &str) -> Option<&str> {
        match strategy {
            MatchStrategy::ExactKey => self.keys.get(cleaned).map(String::as_str),
            MatchStrategy::CaseInsensitiveKey => self
                .by_lower_key
                .get(&cleaned.to_lowercase())
                .map(String::as_str),
            MatchStrategy::NormalizedTitle => self
                .by_normalized_title
                .get(&normalize_title(cleaned))
                .map(String::as_str),
        }
    }
}

/// Trims whitespace and any surrounding quote characters.
pub fn clean_reference(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Lowercases and removes all whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    tables: Vec<LookupTable>,
}

impl FieldResolver {
    pub fn new() -> Self {
        FieldResolver::default()
    }

    pub fn for_schema(schema: &Schema) -> Self {
        FieldResolver::new().with_schema(schema)
    }

    /// Adds configured columns as `(field key, title)` pairs. Sources added
    /// first take precedence.
    pub fn with_columns<'a, I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.tables
            .push(LookupTable::new(CandidateSource::Columns, columns));
        self
    }

    pub fn with_schema(mut self, schema: &Schema) -> Self {
        self.tables.push(LookupTable::new(
            CandidateSource::Schema,
            schema
                .fields()
                .iter()
                .map(|f| (f.key.as_str(), f.title.as_str())),
        ));
        self
    }

    pub fn lookup(&self, raw: &str) -> Resolution {
        let cleaned = clean_reference(raw);
        if !cleaned.is_empty() {
            for table in &self.tables {
                for strategy in MATCH_ORDER {
                    if let Some(key) = table.find(strategy, cleaned) {
                        debug!(
                            "Resolved '{raw}' to '{key}' via {:?}/{strategy:?}",
                            table.source
                        );
                        return Resolution {
                            key: key.to_string(),
                            matched_by: Some((table.source, strategy)),
                        };
                    }
                }
            }
        }
        debug!("No candidate matched '{raw}', keeping '{cleaned}'");
        Resolution {
            key: cleaned.to_string(),
            matched_by: None,
        }
    }

    pub fn resolve(&self, raw: &str) -> String {
        self.lookup(raw).key
    }
}
