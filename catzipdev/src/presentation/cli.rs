use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "catzipdev CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum BackendArg {
    Libsql,
    Json,
}

/// Where records come from; shared by every command.
#[derive(Args)]
pub struct SourceArgs {
    /// JSON configuration file; flags override it
    #[arg(long, global = true, env = "CATZIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path or libsql URL (or JSON records file with --backend json)
    #[arg(long, global = true, env = "CATZIP_DB")]
    pub db: Option<String>,

    #[arg(long, global = true, env = "CATZIP_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print visible category names
    Categories,

    /// Print visible files, grouped, or for one category
    List {
        #[arg(long)]
        category: Option<String>,
    },

    /// Print the first files of each category with totals
    Preview {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write a ZIP of one category (flat) or of everything (by category folder)
    Export {
        /// output .zip path
        #[arg(long)]
        out: PathBuf,

        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        category: Option<String>,

        #[arg(long)]
        all: bool,

        /// pin entry timestamps for byte-identical output
        #[arg(long)]
        deterministic: bool,

        /// folder for uncategorized files with --all (default "기타")
        #[arg(long)]
        uncategorized_label: Option<String>,
    },
}
