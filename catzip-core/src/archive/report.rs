use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Source path does not exist at build time.
    Missing,
    /// Source path exists but is not a regular file.
    NotAFile,
    /// An earlier entry already claimed this archive name.
    Duplicate,
    /// Name would escape the archive root or is empty.
    UnsafeName,
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing => f.write_str("file not found"),
            SkipReason::NotAFile => f.write_str("not a regular file"),
            SkipReason::Duplicate => f.write_str("duplicate archive name"),
            SkipReason::UnsafeName => f.write_str("unsafe archive name"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Written { bytes: u64 },
    Skipped(SkipReason),
}

/// What happened to every candidate of one archive build.
#[derive(Clone, Debug, Default)]
pub struct ArchiveReport {
    pub outcomes: Vec<(String, EntryOutcome)>,
    /// Bytes of archive output handed to the sink.
    pub archive_bytes: u64,
}

impl ArchiveReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, EntryOutcome::Written { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.outcomes.iter().filter_map(|(name, o)| match o {
            EntryOutcome::Skipped(r) => Some((name.as_str(), r)),
            EntryOutcome::Written { .. } => None,
        })
    }

    /// Uncompressed bytes of all written entries.
    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                EntryOutcome::Written { bytes } => *bytes,
                EntryOutcome::Skipped(_) => 0,
            })
            .sum()
    }
}
