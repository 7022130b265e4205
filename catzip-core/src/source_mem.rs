use std::path::Path;

use crate::domain::FileRecord;
use crate::error::{CatalogError, Result};
use crate::source::RecordSource;

/// Fixed in-process record set.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    records: Vec<FileRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of records.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .map_err(|e| CatalogError::SourceUnavailable(format!("{}: {e}", path.display())))?;
        let records = serde_json::from_slice(&raw)
            .map_err(|e| CatalogError::SourceUnavailable(format!("{}: {e}", path.display())))?;
        Ok(Self { records })
    }
}

impl RecordSource for MemorySource {
    async fn records(&self, category: Option<&str>) -> Result<Vec<FileRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| category.is_none() || r.category.as_deref() == category)
            .cloned()
            .collect())
    }
}
