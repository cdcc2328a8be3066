use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Resolve table configurations against content-type schemas",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the grid render options for a table configuration as JSON
    Render(RenderArgs),
    /// List the resolved columns of a table configuration
    Columns(ColumnsArgs),
    /// Parse a sort expression and list the resulting directives
    Sort(SortArgs),
    /// Render sample rows through a table configuration as a text table
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Content-type schema (JSON, or '-' for stdin)
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Table configuration (JSON or YAML by extension)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Built-in customizer to register, by id (repeatable)
    #[arg(long = "customizer", action = clap::ArgAction::Append)]
    pub customizers: Vec<String>,
    /// Emit compact JSON instead of pretty-printed output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Content-type schema (JSON, or '-' for stdin)
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Table configuration (JSON or YAML by extension)
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Sort expression such as `Title:desc,"Due Date":asc`
    #[arg(short, long = "expr")]
    pub expression: String,
    /// Optional schema used to resolve field names
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
    /// Optional table configuration whose columns take precedence when resolving
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Content-type schema (JSON, or '-' for stdin)
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Table configuration (JSON or YAML by extension)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Rows as a JSON array of objects (or `{"data": [...]}`)
    #[arg(short, long)]
    pub data: PathBuf,
    /// Case-insensitive search term applied across all fields
    #[arg(long)]
    pub search: Option<String>,
    /// Maximum number of rows to display after filtering and sorting
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Built-in customizer to register, by id (repeatable)
    #[arg(long = "customizer", action = clap::ArgAction::Append)]
    pub customizers: Vec<String>,
}
