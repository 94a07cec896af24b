//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

/// Filter, sort and facet a JSON record file.
///
/// Filter and sort state is remembered per scope between runs.
#[derive(Debug, Parser)]
#[command(name = "tsift", version, about)]
pub struct Cli {
    /// JSON file holding an array of records.
    #[arg(long, short = 'd', env = "TSIFT_DATA")]
    pub data: PathBuf,

    /// YAML column schema.
    #[arg(long, short = 's', env = "TSIFT_SCHEMA")]
    pub schema: PathBuf,

    /// Directory holding persisted filter state.
    #[arg(long, env = "TSIFT_STATE_DIR", default_value = ".tsift")]
    pub state_dir: PathBuf,

    /// Persistence key; separate scopes keep separate state.
    #[arg(long, env = "TSIFT_SCOPE", default_value = "default")]
    pub scope: String,

    /// Keep state in memory only for this run.
    #[arg(long)]
    pub no_persist: bool,

    /// Evaluation instant (RFC 3339) for date presets. Defaults to now.
    #[arg(long)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the filtered, sorted records.
    List {
        /// Print at most this many records.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the active filters and sort.
    Status,
    /// Set a column's filter.
    Filter(FilterArgs),
    /// Clear one column's filter, or all state when no column is given.
    Clear {
        column: Option<String>,
    },
    /// Sort by a column. Without --dir, cycles asc → desc → none.
    Sort {
        column: String,
        #[arg(long, value_enum)]
        dir: Option<SortDir>,
    },
    /// Print per-option counts for a column over all records.
    Facets {
        column: String,
    },
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("value")
        .required(true)
        .args(["text", "select", "min", "max", "preset", "has", "lacks"])
        .multiple(true)
))]
pub struct FilterArgs {
    pub column: String,

    /// Substring to search for (text columns).
    #[arg(long)]
    pub text: Option<String>,

    /// Accepted option values (enum columns).
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub select: Vec<String>,

    /// Lower bound; currency columns take major units (range columns).
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Upper bound; currency columns take major units (range columns).
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<f64>,

    /// Accepted presets: today, this_week, 7plus_days, never.
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub preset: Vec<String>,

    /// Keep records with a truthy value (boolean columns).
    #[arg(long, conflicts_with = "lacks")]
    pub has: bool,

    /// Keep records without a truthy value (boolean columns).
    #[arg(long)]
    pub lacks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDir {
    Asc,
    Desc,
    None,
}
