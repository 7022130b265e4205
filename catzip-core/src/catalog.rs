use tracing::debug;

use crate::archive::plan::{ArchiveLayout, ArchivePlan, is_exportable, plan_archive};
use crate::config::CatalogConfig;
use crate::domain::{FileRecord, FileRef};
use crate::error::{CatalogError, Result};
use crate::index::group::{self, CategoryIndex};
use crate::index::preview::{self, Preview};
use crate::source::RecordSource;

/// Listing and export operations over one record source.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Catalog<S> {
    source: S,
    config: CatalogConfig,
}

impl<S: RecordSource> Catalog<S> {
    pub fn new(source: S, config: CatalogConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let records = self.source.records(None).await?;
        Ok(group::categories(&records))
    }

    pub async fn list_category(&self, category: &str) -> Result<Vec<FileRef>> {
        let records = self.source.records(Some(category)).await?;
        group::list_category(&records, category)
    }

    pub async fn list_all(&self) -> Result<CategoryIndex> {
        let records = self.source.records(None).await?;
        Ok(group::group_by_category(&records))
    }

    /// `limit` falls back to the configured default.
    pub async fn preview(&self, limit: Option<usize>) -> Result<Preview> {
        let limit = limit.unwrap_or_else(|| self.config.preview_limit());
        let records = self.source.records(None).await?;
        preview::preview(&records, limit)
    }

    /// Flat archive plan for one category.
    pub async fn plan_category_archive(&self, category: &str) -> Result<ArchivePlan> {
        let records: Vec<FileRecord> = self
            .source
            .records(Some(category))
            .await?
            .into_iter()
            .filter(|r| r.listed_category() == Some(category))
            .collect();
        if records.is_empty() {
            return Err(CatalogError::NotFound(format!("category '{category}'")));
        }
        self.plan(records, ArchiveLayout::Flat).await
    }

    /// Namespaced archive plan for the whole catalog.
    pub async fn plan_full_archive(&self) -> Result<ArchivePlan> {
        let records = self.source.records(None).await?;
        if !records
            .iter()
            .any(|r| is_exportable(r, ArchiveLayout::Namespaced))
        {
            return Err(CatalogError::NotFound("the catalog".into()));
        }
        self.plan(records, ArchiveLayout::Namespaced).await
    }

    // Existence checks hit the filesystem; keep them off the async workers.
    async fn plan(&self, records: Vec<FileRecord>, layout: ArchiveLayout) -> Result<ArchivePlan> {
        debug!(candidates = records.len(), ?layout, "planning archive");
        let opts = self.config.archive.clone();
        tokio::task::spawn_blocking(move || plan_archive(&records, layout, &opts))
            .await
            .map_err(|e| CatalogError::Io(std::io::Error::other(e)))?
    }
}
