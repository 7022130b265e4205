use std::path::Path;

use crate::config::{Backend, DatabaseConfig};
use crate::domain::FileRecord;
use crate::error::Result;
use crate::source::RecordSource;
use crate::source_libsql::LibsqlSource;
use crate::source_mem::MemorySource;

/// Record source picked at startup from configuration.
pub enum AnySource {
    Libsql(LibsqlSource),
    Memory(MemorySource),
}

pub async fn open_source(cfg: &DatabaseConfig) -> Result<AnySource> {
    match cfg.backend {
        Backend::Libsql => Ok(AnySource::Libsql(LibsqlSource::open(cfg).await?)),
        Backend::Json => Ok(AnySource::Memory(MemorySource::from_json_file(
            Path::new(cfg.url.trim()),
        )?)),
    }
}

impl RecordSource for AnySource {
    async fn records(&self, category: Option<&str>) -> Result<Vec<FileRecord>> {
        match self {
            AnySource::Libsql(s) => s.records(category).await,
            AnySource::Memory(s) => s.records(category).await,
        }
    }
}
