// catzip_core/src/source.rs
use std::future::Future;

use crate::domain::FileRecord;
use crate::error::Result;

/// Supplies file records. Implementations may pre-filter, but the catalog
/// re-applies the hidden/category rules to whatever comes back.
pub trait RecordSource: Send + Sync {
    /// Records in source order; `None` returns every record.
    fn records(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<FileRecord>>> + Send;
}
