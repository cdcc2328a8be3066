//! Customizers shipped with the crate.
//!
//! Each one targets either every table or a fixed set of table ids.

use std::{collections::BTreeSet, sync::Arc};

use anyhow::Result;
use log::debug;
use serde_json::Value;

use crate::{
    assembly::ResolvedTable,
    config::TableId,
    customize::TableCustomizer,
    data::{display_value, lookup_key},
    formatter::Formatter,
    options::{Layout, RenderOptions},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableTargets(Option<BTreeSet<TableId>>);

impl TableTargets {
    pub fn all() -> Self {
        TableTargets(None)
    }

    pub fn only(ids: impl IntoIterator<Item = TableId>) -> Self {
        TableTargets(Some(ids.into_iter().collect()))
    }

    pub fn contains(&self, id: TableId) -> bool {
        self.0.as_ref().is_none_or(|ids| ids.contains(&id))
    }
}

/// Shortens GUID-like values in columns whose title or field mentions "guid".
#[derive(Debug, Clone, Default)]
pub struct TruncateGuidColumns {
    pub targets: TableTargets,
}

pub const GUID_VISIBLE_CHARS: usize = 8;
const GUID_TRUNCATE_OVER: usize = 10;

pub fn truncate_guid(value: &Value) -> String {
    let text = display_value(value);
    if value.is_string() && text.chars().count() > GUID_TRUNCATE_OVER {
        let head: String = text.chars().take(GUID_VISIBLE_CHARS).collect();
        format!("{head}...")
    } else {
        text
    }
}

impl TableCustomizer for TruncateGuidColumns {
    fn should_apply(&self, table: &ResolvedTable) -> Result<bool> {
        Ok(self.targets.contains(table.id()))
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        for column in options.columns.iter_mut().filter(|c| {
            c.title.to_lowercase().contains("guid") || c.field.to_lowercase().contains("guid")
        }) {
            debug!("Truncating GUID values in column '{}'", column.field);
            column.formatter = Some(Formatter::custom("truncatedGuid", |value, _| {
                truncate_guid(value)
            }));
            column.formatter_params.clear();
        }
        Ok(options)
    }
}

/// Switches the grid to fit its columns to the available width.
#[derive(Debug, Clone, Default)]
pub struct FitColumnsLayout {
    pub targets: TableTargets,
}

impl TableCustomizer for FitColumnsLayout {
    fn should_apply(&self, table: &ResolvedTable) -> Result<bool> {
        Ok(self.targets.contains(table.id()))
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        options.layout = Layout::FitColumns;
        Ok(options)
    }
}

/// Turns the `url` column into an absolute access-code URL built from the row's `code`.
#[derive(Debug, Clone, Default)]
pub struct AccessCodeLinks {
    pub targets: TableTargets,
    /// Prefix for relative URLs, e.g. `https://example.org`.
    pub origin: String,
}

pub fn access_code_url(code: &str, origin: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        return String::new();
    }
    let lower = code.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return code.to_string();
    }
    let path = if code.starts_with('/') {
        code.to_string()
    } else {
        format!("?accesscode={code}")
    };
    format!("{}{path}", origin.trim_end_matches('/'))
}

impl TableCustomizer for AccessCodeLinks {
    fn should_apply(&self, table: &ResolvedTable) -> Result<bool> {
        Ok(self.targets.contains(table.id()))
    }

    fn customize_render_options(&self, mut options: RenderOptions) -> Result<RenderOptions> {
        if let Some(column) = options
            .columns
            .iter_mut()
            .find(|c| c.title.eq_ignore_ascii_case("url"))
        {
            let origin = self.origin.clone();
            column.formatter = Some(Formatter::custom("accessCodeUrl", move |_, row| {
                let code = lookup_key(row, "code").map(display_value).unwrap_or_default();
                access_code_url(&code, &origin)
            }));
            column.formatter_params.clear();
        }
        Ok(options)
    }
}

/// Every built-in customizer, applying to all tables.
pub fn builtin_customizers() -> Vec<Arc<dyn TableCustomizer>> {
    vec![
        Arc::new(TruncateGuidColumns::default()),
        Arc::new(FitColumnsLayout::default()),
        Arc::new(AccessCodeLinks::default()),
    ]
}
