use libsql::{Builder, Database, Row, Value};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::domain::FileRecord;
use crate::error::{CatalogError, Result};
use crate::source::RecordSource;

const SELECT_ALL: &str = "SELECT FILE_NAME, FILE_PATH, CATEGORY, HIDE FROM FILES ORDER BY rowid";
const SELECT_CATEGORY: &str =
    "SELECT FILE_NAME, FILE_PATH, CATEGORY, HIDE FROM FILES WHERE CATEGORY = ?1 ORDER BY rowid";

/// Records from the `FILES` table of a libsql/SQLite database.
pub struct LibsqlSource {
    db: Database,
}

impl LibsqlSource {
    pub async fn open(cfg: &DatabaseConfig) -> Result<Self> {
        let url = cfg.url.trim();
        if url.is_empty() {
            return Err(CatalogError::Config("database url is not set".into()));
        }
        let db = if cfg.is_remote() {
            let token = cfg.auth_token.clone().ok_or_else(|| {
                CatalogError::Config("remote database requires an auth token".into())
            })?;
            Builder::new_remote(url.to_string(), token).build().await?
        } else {
            Builder::new_local(url).build().await?
        };
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }
}

fn text(v: Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        Value::Null => None,
    }
}

// HIDE is stored as 0/1 but older rows carry it as text.
fn flag(v: Value) -> bool {
    match v {
        Value::Integer(i) => i != 0,
        Value::Real(f) => f != 0.0,
        Value::Text(s) => !matches!(s.trim(), "" | "0" | "false" | "N" | "n"),
        Value::Blob(_) | Value::Null => false,
    }
}

fn row_to_record(row: &Row) -> Result<FileRecord> {
    Ok(FileRecord {
        name: text(row.get_value(0)?).unwrap_or_default(),
        path: text(row.get_value(1)?).unwrap_or_default(),
        category: text(row.get_value(2)?),
        hidden: flag(row.get_value(3)?),
    })
}

impl RecordSource for LibsqlSource {
    async fn records(&self, category: Option<&str>) -> Result<Vec<FileRecord>> {
        let conn = self.db.connect()?;
        let mut rows = match category {
            Some(c) => conn.query(SELECT_CATEGORY, [c.to_string()]).await?,
            None => conn.query(SELECT_ALL, ()).await?,
        };
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_record(&row)?);
        }
        debug!(category = ?category, rows = out.len(), "records fetched");
        Ok(out)
    }
}
