use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::report::SkipReason;
use crate::config::ArchiveOptions;
use crate::domain::FileRecord;
use crate::error::{CatalogError, Result};
use crate::util::sanitize;

/// How archive names are derived from records.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArchiveLayout {
    /// `name` verbatim.
    Flat,
    /// `category/name`.
    Namespaced,
}

#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    pub arc_name: String,
    pub source_path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Entries that passed every check, in input order, plus what was dropped.
#[derive(Clone, Debug)]
pub struct ArchivePlan {
    pub layout: ArchiveLayout,
    pub entries: Vec<ArchiveEntry>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl ArchivePlan {
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

struct Candidate<'a> {
    arc_name: String,
    record: &'a FileRecord,
}

enum Stat {
    Ready { size: u64, modified: Option<SystemTime> },
    Skip(SkipReason),
}

/// Whether a record is eligible for `layout` (visibility only, no I/O).
///
/// Namespaced exports file uncategorized records under the configured label;
/// flat exports only ever see one category.
pub fn is_exportable(record: &FileRecord, layout: ArchiveLayout) -> bool {
    !record.hidden && (record.category.is_some() || layout == ArchiveLayout::Namespaced)
}

fn raw_arc_name(record: &FileRecord, layout: ArchiveLayout, opts: &ArchiveOptions) -> String {
    match layout {
        ArchiveLayout::Flat => record.name.clone(),
        ArchiveLayout::Namespaced => {
            let folder = record
                .category
                .as_deref()
                .unwrap_or(&opts.uncategorized_label);
            format!("{folder}/{}", record.name)
        }
    }
}

fn stat(path: &str) -> Stat {
    if path.is_empty() {
        return Stat::Skip(SkipReason::Missing);
    }
    match fs::metadata(path) {
        Ok(md) if md.is_file() => Stat::Ready {
            size: md.len(),
            modified: md.modified().ok(),
        },
        Ok(_) => Stat::Skip(SkipReason::NotAFile),
        Err(e) if e.kind() == ErrorKind::NotFound => Stat::Skip(SkipReason::Missing),
        Err(e) => Stat::Skip(SkipReason::Unreadable(e.to_string())),
    }
}

fn note_skip(
    skipped: &mut Vec<(String, SkipReason)>,
    arc_name: String,
    path: &str,
    reason: SkipReason,
) {
    warn!(arc_name = %arc_name, path = %path, reason = %reason, "skipping archive entry");
    skipped.push((arc_name, reason));
}

/// Resolve records into archive entries.
///
/// Existence is checked now, not when the record was catalogued. Paths are
/// checked in parallel; the resulting plan keeps input order. When two entries
/// resolve to the same archive name the later one is skipped. Fails with
/// `EmptyArchive` when nothing is left to write and with `LimitExceeded` when
/// the configured entry or size caps are crossed.
pub fn plan_archive(
    records: &[FileRecord],
    layout: ArchiveLayout,
    opts: &ArchiveOptions,
) -> Result<ArchivePlan> {
    let mut skipped = Vec::new();
    let mut candidates = Vec::new();
    for record in records.iter().filter(|r| is_exportable(r, layout)) {
        let raw = raw_arc_name(record, layout, opts);
        match sanitize::arc_name(&raw) {
            Some(arc_name) => candidates.push(Candidate { arc_name, record }),
            None => note_skip(&mut skipped, raw, &record.path, SkipReason::UnsafeName),
        }
    }

    let stats: Vec<Stat> = candidates
        .par_iter()
        .map(|c| stat(&c.record.path))
        .collect();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for (c, p) in candidates.into_iter().zip(stats) {
        match p {
            Stat::Skip(reason) => note_skip(&mut skipped, c.arc_name, &c.record.path, reason),
            Stat::Ready { .. } if seen.contains(&c.arc_name) => {
                note_skip(&mut skipped, c.arc_name, &c.record.path, SkipReason::Duplicate)
            }
            Stat::Ready { size, modified } => {
                seen.insert(c.arc_name.clone());
                entries.push(ArchiveEntry {
                    arc_name: c.arc_name,
                    source_path: PathBuf::from(&c.record.path),
                    size,
                    modified,
                });
            }
        }
    }

    if entries.is_empty() {
        return Err(CatalogError::EmptyArchive);
    }
    if let Some(max) = opts.max_entries {
        if entries.len() as u64 > max {
            return Err(CatalogError::LimitExceeded(format!(
                "{} entries (max {max})",
                entries.len()
            )));
        }
    }
    let plan = ArchivePlan {
        layout,
        entries,
        skipped,
    };
    if let Some(max) = opts.max_total_bytes {
        let total = plan.total_bytes();
        if total > max {
            return Err(CatalogError::LimitExceeded(format!(
                "{total} bytes (max {max})"
            )));
        }
    }
    debug!(
        entries = plan.entries.len(),
        skipped = plan.skipped.len(),
        bytes = plan.total_bytes(),
        "archive planned"
    );
    Ok(plan)
}
