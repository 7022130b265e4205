use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use catzip_core::{Backend, Catalog, CatalogConfig, open_source};
use catzip_http::router;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Category archive HTTP server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CATZIP_LISTEN", default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// JSON configuration file; flags below override it
    #[arg(long, env = "CATZIP_CONFIG")]
    config: Option<PathBuf>,

    /// Database path or libsql URL (or JSON records file with --backend json)
    #[arg(long, env = "CATZIP_DB")]
    db: Option<String>,

    #[arg(long, env = "CATZIP_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Files per category in previews when the request gives no limit
    #[arg(long)]
    preview_limit: Option<usize>,

    /// Pin archive timestamps for byte-identical downloads
    #[arg(long)]
    deterministic: bool,

    #[arg(long)]
    max_entries: Option<u64>,

    #[arg(long)]
    max_bytes: Option<u64>,

    /// Folder for uncategorized files in full downloads (default "기타")
    #[arg(long)]
    uncategorized_label: Option<String>,
}

#[derive(Copy, Clone, clap::ValueEnum)]
enum BackendArg {
    Libsql,
    Json,
}

impl Args {
    fn into_config(self) -> catzip_core::Result<CatalogConfig> {
        let mut cfg = match &self.config {
            Some(p) => CatalogConfig::from_json_file(p)?,
            None => CatalogConfig::default(),
        };
        if let Some(db) = self.db {
            cfg.database.url = db;
        }
        if self.auth_token.is_some() {
            cfg.database.auth_token = self.auth_token;
        }
        if let Some(b) = self.backend {
            cfg.database.backend = match b {
                BackendArg::Libsql => Backend::Libsql,
                BackendArg::Json => Backend::Json,
            };
        }
        if self.preview_limit.is_some() {
            cfg.default_preview_limit = self.preview_limit;
        }
        cfg.archive.deterministic |= self.deterministic;
        if self.max_entries.is_some() {
            cfg.archive.max_entries = self.max_entries;
        }
        if self.max_bytes.is_some() {
            cfg.archive.max_total_bytes = self.max_bytes;
        }
        if let Some(label) = self.uncategorized_label {
            cfg.archive.uncategorized_label = label;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let listen = args.listen;
    let config = args.into_config()?;
    let source = open_source(&config.database).await?;
    let app = router(Arc::new(Catalog::new(source, config)));

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
