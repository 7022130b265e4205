#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;

pub mod util {
    pub mod sanitize;
    pub mod sink;
}

pub mod index {
    pub mod group;
    pub mod preview;
}

pub mod archive {
    pub mod plan;
    pub mod report;
    pub mod writer;
}

pub mod source;
pub mod source_factory;
pub mod source_libsql;
pub mod source_mem;

// Re-exports: stable API surface
pub use archive::plan::{ArchiveEntry, ArchiveLayout, ArchivePlan, plan_archive};
pub use archive::report::{ArchiveReport, EntryOutcome, SkipReason};
pub use archive::writer::{CancelFlag, write_archive};
pub use catalog::Catalog;
pub use config::{
    ArchiveOptions, Backend, CatalogConfig, DEFAULT_UNCATEGORIZED_LABEL, DatabaseConfig,
};
pub use domain::{CategoryGroup, FileRecord, FileRef};
pub use error::{CatalogError, Result};
pub use index::group::{CategoryIndex, group_by_category};
pub use index::preview::{Preview, preview};
pub use source::RecordSource;
pub use source_factory::{AnySource, open_source};
pub use source_libsql::LibsqlSource;
pub use source_mem::MemorySource;
