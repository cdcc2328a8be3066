//! Text preview of an assembled table over sample rows.
//!
//! Applies the grid's behavior outside the grid: the search filter, the
//! multi-column initial sort and each column's formatter.

use std::cmp::Ordering;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};
use serde_json::Value;

use crate::{
    assembly::AssembledTable,
    cli::PreviewArgs,
    data::{self, Row, display_value, lookup_path},
    formatter::compare_auto,
    options::ColumnDescriptor,
    sort::SortDirective,
    table,
};

/// Case-insensitive substring match against every value in the row.
pub fn matches_search(row: &Row, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    row.values().any(|value| {
        let text = match value {
            Value::Object(_) | Value::Array(_) => value.to_string(),
            other => display_value(other),
        };
        text.to_lowercase().contains(&needle)
    })
}

/// Stable sort, `sort[0]` primary. Columns without a sorter compare numbers
/// numerically and everything else as case-insensitive text.
pub fn sort_rows(rows: &mut [Row], sort: &[SortDirective], columns: &[ColumnDescriptor]) {
    if sort.is_empty() {
        return;
    }
    let keys = sort
        .iter()
        .map(|directive| {
            let sorter = columns
                .iter()
                .find(|c| c.field == directive.field_key)
                .and_then(|c| c.sorter);
            (directive, sorter)
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|(directive, sorter)| {
                let left = lookup_path(a, &directive.field_key).unwrap_or(&Value::Null);
                let right = lookup_path(b, &directive.field_key).unwrap_or(&Value::Null);
                let ordering = match sorter {
                    Some(sorter) => sorter.compare(left, right),
                    None => compare_auto(left, right),
                };
                if directive.direction.is_ascending() {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

pub fn render_preview(
    assembled: &AssembledTable,
    rows: &[Row],
    search: Option<&str>,
    limit: Option<usize>,
) -> String {
    let columns = &assembled.options.columns;
    let mut visible = rows
        .iter()
        .filter(|row| search.is_none_or(|term| matches_search(row, term)))
        .cloned()
        .collect::<Vec<_>>();
    sort_rows(&mut visible, &assembled.table.sort, columns);
    if let Some(limit) = limit {
        visible.truncate(limit);
    }

    let headers = columns.iter().map(|c| c.title.clone()).collect::<Vec<_>>();
    let alignments = columns
        .iter()
        .map(|c| c.hoz_align.unwrap_or_default())
        .collect::<Vec<_>>();
    let cells = visible
        .iter()
        .map(|row| columns.iter().map(|c| c.format_cell(row)).collect())
        .collect::<Vec<Vec<String>>>();
    table::render_table(&headers, &cells, &alignments)
}

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let mut assembly = crate::build_assembly(&args.customizers)?;
    let (config, schema) = crate::load_table_inputs(&args.schema, &args.config)?;
    let rows = data::load_rows(&args.data)
        .with_context(|| format!("Loading rows from {:?}", args.data))?;
    let search_enabled = config.search_enabled;
    let assembled = assembly.assemble(config, &schema);
    if args.search.is_some() && !search_enabled {
        warn!("Table has search disabled; filtering anyway");
    }

    let rendered = render_preview(&assembled, &rows, args.search.as_deref(), args.limit);
    print!("{rendered}");
    info!(
        "Previewed {} row(s) across columns [{}]",
        rendered.lines().count().saturating_sub(2),
        assembled.options.columns.iter().map(|c| &c.field).join(", ")
    );
    Ok(())
}
