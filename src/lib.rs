pub mod assembly;
pub mod cli;
pub mod columns;
pub mod config;
pub mod customize;
pub mod customizers;
pub mod data;
pub mod formats;
pub mod formatter;
pub mod html;
pub mod io_utils;
pub mod options;
pub mod preview;
pub mod resolver;
pub mod schema;
pub mod sort;
pub mod table;
pub mod template;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::{
    assembly::{ResolvedTable, TableAssembly},
    cli::{Cli, Commands},
    columns::{Tooltip, resolve_columns},
    config::TableConfig,
    customize::CustomizerRegistry,
    schema::Schema,
    sort::parse_sort,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("gridspec", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => handle_render(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Sort(args) => handle_sort(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

/// Registers the requested built-in customizers, in the order given.
pub(crate) fn build_assembly(ids: &[String]) -> Result<TableAssembly> {
    let available = customizers::builtin_customizers();
    let mut registry = CustomizerRegistry::new();
    for id in ids {
        let Some(customizer) = available.iter().find(|c| c.id() == *id) else {
            bail!(
                "Unknown customizer '{id}' (available: {})",
                available.iter().map(|c| c.id()).join(", ")
            );
        };
        if !registry.register_shared(customizer.clone()) {
            debug!("Customizer '{id}' requested more than once");
        }
    }
    Ok(TableAssembly::new(registry))
}

pub(crate) fn load_table_inputs(schema: &Path, config: &Path) -> Result<(TableConfig, Schema)> {
    let schema =
        Schema::load(schema).with_context(|| format!("Loading schema from {schema:?}"))?;
    let config = TableConfig::load(config)
        .with_context(|| format!("Loading table configuration from {config:?}"))?;
    debug!(
        "Loaded table '{}' ({} configured column(s)) against {} schema field(s)",
        config.title,
        config.columns.len(),
        schema.len()
    );
    Ok((config, schema))
}

fn handle_render(args: &cli::RenderArgs) -> Result<()> {
    let mut assembly = build_assembly(&args.customizers)?;
    let (config, schema) = load_table_inputs(&args.schema, &args.config)?;
    info!("Rendering table '{}' ({})", config.title, config.guid);
    let assembled = assembly.assemble(config, &schema);
    let json = if args.compact {
        serde_json::to_string(&assembled.options)
    } else {
        assembled.options.to_json_pretty()
    }
    .context("Serializing render options")?;
    println!("{json}");
    info!(
        "Rendered {} column(s) with {} active customizer(s)",
        assembled.options.columns.len(),
        assembly
            .registry()
            .active_customizers(assembled.table.id())
            .len()
    );
    Ok(())
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let (config, schema) = load_table_inputs(&args.schema, &args.config)?;
    let table = ResolvedTable::resolve(config, &schema);
    let headers = ["Field", "Title", "Format", "Align", "Formatter", "Sorter", "Link", "Tooltip", "Auto"]
        .map(String::from);
    let rows = table
        .columns
        .iter()
        .map(|c| {
            vec![
                c.field_key.clone(),
                c.title.clone(),
                c.render_format.to_string(),
                c.alignment.map(|a| a.as_str().to_string()).unwrap_or_default(),
                c.formatter.as_ref().map(|f| f.name().to_string()).unwrap_or_default(),
                c.sorter.map(|s| s.name().to_string()).unwrap_or_default(),
                c.link
                    .as_ref()
                    .map(|l| format!("view {} {}", l.view_id, l.parameters.source()))
                    .unwrap_or_default(),
                match &c.tooltip {
                    Tooltip::Disabled => String::new(),
                    Tooltip::RawValue => "value".to_string(),
                    Tooltip::Template(t) => t.source().to_string(),
                },
                if c.auto_generated { "yes" } else { "" }.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows, &[]);
    info!("Resolved {} column(s)", rows.len());
    Ok(())
}

fn handle_sort(args: &cli::SortArgs) -> Result<()> {
    let schema = match &args.schema {
        Some(path) => {
            Schema::load(path).with_context(|| format!("Loading schema from {path:?}"))?
        }
        None => Schema::default(),
    };
    let columns = match &args.config {
        Some(path) => {
            let config = TableConfig::load(path)
                .with_context(|| format!("Loading table configuration from {path:?}"))?;
            resolve_columns(&config.columns, config.columns_auto_show_remaining, &schema)
        }
        None => Vec::new(),
    };
    let directives = parse_sort(&args.expression, &columns, &schema);
    let headers = ["Priority", "Column", "Direction"].map(String::from);
    let rows = directives
        .iter()
        .enumerate()
        .map(|(idx, d)| vec![(idx + 1).to_string(), d.field_key.clone(), d.direction.to_string()])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows, &[]);
    info!("Parsed {} sort directive(s)", directives.len());
    Ok(())
}
