use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no visible files in {0}")]
    NotFound(String),

    #[error("none of the matching files exist on disk")]
    EmptyArchive,

    #[error("record source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("preview limit must be at least 1 (got {0})")]
    InvalidLimit(usize),

    #[error("archive limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("archive build cancelled")]
    Cancelled,

    #[error("Zip error: {0}")]
    Zip(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for CatalogError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => CatalogError::Io(io),
            other => CatalogError::Zip(other.to_string()),
        }
    }
}

impl From<libsql::Error> for CatalogError {
    fn from(e: libsql::Error) -> Self {
        CatalogError::SourceUnavailable(e.to_string())
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, CatalogError>;
