use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PREVIEW_LIMIT: usize = 5;
/// Folder that namespaced exports use for records without a category.
pub const DEFAULT_UNCATEGORIZED_LABEL: &str = "기타";

/// Which record source backs the catalog.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Libsql,
    /// JSON array of file records; fixtures and offline use.
    Json,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    /// Local database path, `libsql://`/`https://` URL, or JSON file for `Backend::Json`.
    pub url: String,
    pub auth_token: Option<String>,
}

impl DatabaseConfig {
    pub fn is_remote(&self) -> bool {
        let url = self.url.trim();
        url.starts_with("libsql://") || url.starts_with("http://") || url.starts_with("https://")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// When true, entry timestamps are pinned to the DOS epoch for reproducible bytes.
    pub deterministic: bool,
    /// Deflate level; `None` uses the encoder default.
    pub compression_level: Option<i64>,
    pub max_entries: Option<u64>,
    /// Upper bound on the summed size of the source files.
    pub max_total_bytes: Option<u64>,
    /// Folder for records without a category in namespaced exports.
    pub uncategorized_label: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            deterministic: false,
            compression_level: None,
            max_entries: None,
            max_total_bytes: None,
            uncategorized_label: DEFAULT_UNCATEGORIZED_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: DatabaseConfig,
    pub default_preview_limit: Option<usize>,
    pub archive: ArchiveOptions,
}

impl CatalogConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        serde_json::from_slice(&raw)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))
    }

    pub fn preview_limit(&self) -> usize {
        self.default_preview_limit.unwrap_or(DEFAULT_PREVIEW_LIMIT)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(CatalogError::Config("database url is not set".into()));
        }
        if self.database.backend == Backend::Libsql
            && self.database.is_remote()
            && self.database.auth_token.is_none()
        {
            return Err(CatalogError::Config(
                "remote database requires an auth token".into(),
            ));
        }
        if self.default_preview_limit == Some(0) {
            return Err(CatalogError::Config(
                "default_preview_limit must be at least 1".into(),
            ));
        }
        if let Some(level) = self.archive.compression_level {
            if !(0..=9).contains(&level) {
                return Err(CatalogError::Config(format!(
                    "compression_level must be within 0..=9 (got {level})"
                )));
            }
        }
        let label = &self.archive.uncategorized_label;
        if crate::util::sanitize::arc_name(label).is_none() {
            return Err(CatalogError::Config(format!(
                "uncategorized_label is not a usable folder name: {label:?}"
            )));
        }
        Ok(())
    }
}
