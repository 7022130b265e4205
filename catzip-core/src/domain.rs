// catzip_core/src/domain.rs
use serde::{Deserialize, Serialize};

/// One catalogued file as the record source reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            category: category.map(str::to_string),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Category under which this record may be shown, if any.
    pub fn listed_category(&self) -> Option<&str> {
        if self.hidden {
            None
        } else {
            self.category.as_deref()
        }
    }

    pub fn is_listed(&self) -> bool {
        self.listed_category().is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub path: String,
}

impl From<&FileRecord> for FileRef {
    fn from(r: &FileRecord) -> Self {
        Self {
            name: r.name.clone(),
            path: r.path.clone(),
        }
    }
}

/// Per-category slice of a preview: the kept files plus the untruncated count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    #[serde(skip)]
    pub category: String,
    pub files: Vec<FileRef>,
    pub total_count: usize,
}
