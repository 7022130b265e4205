pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use catzip_core::error::Result;
use clap::Parser;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = handlers::config_from_args(&cli.source)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async move {
        match cli.command {
            Commands::Categories => handlers::handle_categories(config).await,
            Commands::List { category } => handlers::handle_list(config, category).await,
            Commands::Preview { limit } => handlers::handle_preview(config, limit).await,
            Commands::Export {
                out,
                category,
                all,
                deterministic,
                uncategorized_label,
            } => {
                handlers::handle_export(
                    config,
                    out,
                    if all { None } else { category },
                    deterministic,
                    uncategorized_label,
                )
                .await
            }
        }
    })
}
