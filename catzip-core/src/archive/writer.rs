use std::fs::File;
use std::io::{ErrorKind, Read, Seek, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use time::OffsetDateTime;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::plan::{ArchiveEntry, ArchivePlan};
use super::report::{ArchiveReport, EntryOutcome, SkipReason};
use crate::config::ArchiveOptions;
use crate::error::{CatalogError, Result};
use crate::util::sink::{GuardedSink, Seal};

const COPY_BUF_LEN: usize = 1 << 16;

/// Shared abort signal for an in-flight archive build.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

fn entry_time(entry: &ArchiveEntry, opts: &ArchiveOptions) -> DateTime {
    if opts.deterministic {
        return DateTime::default();
    }
    entry
        .modified
        .map(OffsetDateTime::from)
        .and_then(|t| {
            DateTime::from_date_and_time(
                u16::try_from(t.year()).ok()?,
                u8::from(t.month()),
                t.day(),
                t.hour(),
                t.minute(),
                t.second(),
            )
            .ok()
        })
        .unwrap_or_default()
}

fn entry_options(entry: &ArchiveEntry, opts: &ArchiveOptions) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(opts.compression_level)
        .last_modified_time(entry_time(entry, opts))
        .large_file(entry.size >= u64::from(u32::MAX))
}

fn open_source(entry: &ArchiveEntry, report: &mut ArchiveReport) -> Option<File> {
    match File::open(&entry.source_path) {
        Ok(f) => Some(f),
        Err(e) => {
            let reason = if e.kind() == ErrorKind::NotFound {
                SkipReason::Missing
            } else {
                SkipReason::Unreadable(e.to_string())
            };
            warn!(
                arc_name = %entry.arc_name,
                path = %entry.source_path.display(),
                reason = %reason,
                "skipping archive entry"
            );
            report
                .outcomes
                .push((entry.arc_name.clone(), EntryOutcome::Skipped(reason)));
            None
        }
    }
}

fn copy_entry<Z: Write + Seek>(
    zip: &mut ZipWriter<Z>,
    entry: &ArchiveEntry,
    mut src: File,
    buf: &mut [u8],
    opts: &ArchiveOptions,
    cancel: &CancelFlag,
) -> Result<u64> {
    zip.start_file(entry.arc_name.as_str(), entry_options(entry, opts))?;
    let mut written = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        let n = src.read(buf)?;
        if n == 0 {
            break;
        }
        zip.write_all(&buf[..n])?;
        written += n as u64;
    }
    Ok(written)
}

fn write_entries<'p, Z: Write + Seek>(
    zip: &mut ZipWriter<Z>,
    (first, first_src): (&'p ArchiveEntry, File),
    rest: impl Iterator<Item = &'p ArchiveEntry>,
    report: &mut ArchiveReport,
    opts: &ArchiveOptions,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut buf = vec![0u8; COPY_BUF_LEN];
    let bytes = copy_entry(zip, first, first_src, &mut buf, opts, cancel)?;
    report
        .outcomes
        .push((first.arc_name.clone(), EntryOutcome::Written { bytes }));

    for entry in rest {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        let Some(src) = open_source(entry, report) else {
            continue;
        };
        let bytes = copy_entry(zip, entry, src, &mut buf, opts, cancel)?;
        report
            .outcomes
            .push((entry.arc_name.clone(), EntryOutcome::Written { bytes }));
    }
    Ok(())
}

/// Stream `plan` as a ZIP archive into `sink`, one entry at a time.
///
/// The sink never needs to seek, so it can be a socket or a channel. Files are
/// opened right before their entry starts; one that disappeared since planning
/// is skipped. Nothing reaches the sink until the first file has been opened,
/// so a build where every file vanished fails with `EmptyArchive` and leaves
/// the sink untouched. `cancel` is polled between entries and copied chunks.
/// A build that fails midway stops writing to the sink at the point of
/// failure; the truncated output is never given a central directory.
pub fn write_archive<W: Write>(
    plan: &ArchivePlan,
    mut sink: W,
    opts: &ArchiveOptions,
    cancel: &CancelFlag,
) -> Result<ArchiveReport> {
    let mut report = ArchiveReport {
        outcomes: plan
            .skipped
            .iter()
            .map(|(name, r)| (name.clone(), EntryOutcome::Skipped(r.clone())))
            .collect(),
        archive_bytes: 0,
    };

    let mut entries = plan.entries.iter();
    let (first, first_src) = loop {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        let Some(entry) = entries.next() else {
            return Err(CatalogError::EmptyArchive);
        };
        if let Some(src) = open_source(entry, &mut report) {
            break (entry, src);
        }
    };

    // ZipWriter finalizes on drop, so it only exists once there is something to write.
    let seal = Seal::default();
    let mut guarded = GuardedSink::new(&mut sink, seal.clone());
    let mut zip = ZipWriter::new_stream(&mut guarded);
    if let Err(e) = write_entries(&mut zip, (first, first_src), entries, &mut report, opts, cancel)
    {
        seal.seal();
        return Err(e);
    }
    let _ = zip.finish()?;
    guarded.flush()?;
    report.archive_bytes = guarded.written();

    info!(
        written = report.written(),
        skipped = report.skipped().count(),
        bytes = report.total_bytes(),
        archive_bytes = report.archive_bytes,
        "archive written"
    );
    Ok(report)
}
