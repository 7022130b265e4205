use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::{CategoryGroup, FileRecord};
use crate::error::{CatalogError, Result};

/// Bounded per-category listing. Serializes as
/// `{category: {"files": [...], "total_count": n}}` in category order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preview {
    groups: Vec<CategoryGroup>,
}

impl Preview {
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn get(&self, category: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for Preview {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for g in &self.groups {
            map.serialize_entry(&g.category, g)?;
        }
        map.end()
    }
}

/// First `limit` files of each category, ordered by (category, name), with the
/// true number of visible files per category.
pub fn preview(records: &[FileRecord], limit: usize) -> Result<Preview> {
    if limit == 0 {
        return Err(CatalogError::InvalidLimit(limit));
    }

    let mut visible: Vec<(&str, &FileRecord)> = records
        .iter()
        .filter_map(|r| r.listed_category().map(|c| (c, r)))
        .collect();
    // stable: equal (category, name) keys keep source order
    visible.sort_by(|(ca, a), (cb, b)| ca.cmp(cb).then_with(|| a.name.cmp(&b.name)));

    let mut groups: IndexMap<&str, CategoryGroup> = IndexMap::new();
    for (cat, rec) in visible {
        let g = groups.entry(cat).or_insert_with(|| CategoryGroup {
            category: cat.to_string(),
            files: Vec::new(),
            total_count: 0,
        });
        g.total_count += 1;
        if g.files.len() < limit {
            g.files.push(rec.into());
        }
    }

    Ok(Preview {
        groups: groups.into_values().collect(),
    })
}
