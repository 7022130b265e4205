use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::domain::{FileRecord, FileRef};
use crate::error::{CatalogError, Result};

/// Category name -> files, in first-seen order.
pub type CategoryIndex = IndexMap<String, Vec<FileRef>>;

/// Group visible records by category, keeping the source order of both
/// categories and files. Hidden and uncategorized records are dropped.
pub fn group_by_category<'a, I>(records: I) -> CategoryIndex
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    let mut index = CategoryIndex::new();
    for rec in records {
        if let Some(cat) = rec.listed_category() {
            index.entry(cat.to_string()).or_default().push(rec.into());
        }
    }
    index
}

/// Visible files of one category, in source order.
pub fn list_category(records: &[FileRecord], category: &str) -> Result<Vec<FileRef>> {
    let files: Vec<FileRef> = records
        .iter()
        .filter(|r| r.listed_category() == Some(category))
        .map(FileRef::from)
        .collect();
    if files.is_empty() {
        return Err(CatalogError::NotFound(format!("category '{category}'")));
    }
    Ok(files)
}

/// Distinct visible category names, sorted.
pub fn categories(records: &[FileRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(FileRecord::listed_category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
