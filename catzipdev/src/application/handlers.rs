use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use catzip_core::error::{CatalogError, Result};
use catzip_core::{
    AnySource, Backend, CancelFlag, Catalog, CatalogConfig, open_source, write_archive,
};
use serde::Serialize;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::presentation::cli::{BackendArg, SourceArgs};

pub fn config_from_args(args: &SourceArgs) -> Result<CatalogConfig> {
    let mut cfg = match &args.config {
        Some(p) => CatalogConfig::from_json_file(p)?,
        None => CatalogConfig::default(),
    };
    if let Some(db) = &args.db {
        cfg.database.url = db.clone();
    }
    if let Some(token) = &args.auth_token {
        cfg.database.auth_token = Some(token.clone());
    }
    if let Some(b) = args.backend {
        cfg.database.backend = match b {
            BackendArg::Libsql => Backend::Libsql,
            BackendArg::Json => Backend::Json,
        };
    }
    Ok(cfg)
}

async fn open_catalog(config: CatalogConfig) -> Result<Catalog<AnySource>> {
    config.validate()?;
    debug!(backend = ?config.database.backend, url = %config.database.url, "opening record source");
    let source = open_source(&config.database).await?;
    Ok(Catalog::new(source, config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

pub async fn handle_categories(config: CatalogConfig) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let categories = catalog.categories().await?;
    print_json(&json!({ "categories": categories }))
}

pub async fn handle_list(config: CatalogConfig, category: Option<String>) -> Result<()> {
    let catalog = open_catalog(config).await?;
    match category {
        Some(c) => {
            let files = catalog.list_category(&c).await?;
            print_json(&json!({ "count": files.len(), "files": files }))
        }
        None => print_json(&catalog.list_all().await?),
    }
}

pub async fn handle_preview(config: CatalogConfig, limit: Option<usize>) -> Result<()> {
    let catalog = open_catalog(config).await?;
    print_json(&catalog.preview(limit).await?)
}

/// `category == None` exports the whole catalog.
pub async fn handle_export(
    mut config: CatalogConfig,
    out: PathBuf,
    category: Option<String>,
    deterministic: bool,
    uncategorized_label: Option<String>,
) -> Result<()> {
    config.archive.deterministic |= deterministic;
    if let Some(label) = uncategorized_label {
        config.archive.uncategorized_label = label;
    }
    let catalog = open_catalog(config).await?;
    let plan = match &category {
        Some(c) => catalog.plan_category_archive(c).await?,
        None => catalog.plan_full_archive().await?,
    };

    // stage next to the target so a failed export never leaves a partial zip behind
    let dir = out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    let opts = catalog.config().archive.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let report = {
            let mut w = BufWriter::new(tmp.as_file_mut());
            write_archive(&plan, &mut w, &opts, &CancelFlag::new())?
        };
        tmp.persist(&out).map_err(|e| CatalogError::Io(e.error))?;
        Ok((report, out))
    })
    .await
    .map_err(|e| CatalogError::Io(std::io::Error::other(e)))??;

    let (report, out) = report;
    for (name, reason) in report.skipped() {
        eprintln!("export: skipped {name} ({reason})");
    }
    eprintln!(
        "export: wrote {} entries ({} bytes) to {}",
        report.written(),
        report.archive_bytes,
        out.display()
    );
    Ok(())
}
