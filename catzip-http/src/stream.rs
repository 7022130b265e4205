use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::response::{IntoResponse, Response};
use catzip_core::{
    ArchiveOptions, ArchivePlan, ArchiveReport, CancelFlag, CatalogError, write_archive,
};
use futures_core::Stream;
use http::{HeaderValue, StatusCode, header};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::disposition;
use crate::error::ApiError;

const CHUNK_LEN: usize = 64 * 1024;
const CHANNEL_DEPTH: usize = 8;

type Chunk = io::Result<Bytes>;

/// Blocking `Write` end of the response body. Bytes are batched into chunks and
/// handed to the async side; a closed receiver means the client is gone.
struct ChannelWriter {
    tx: mpsc::Sender<Chunk>,
    buf: Vec<u8>,
}

impl ChannelWriter {
    fn new(tx: mpsc::Sender<Chunk>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_LEN),
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::replace(
            &mut self.buf,
            Vec::with_capacity(CHUNK_LEN),
        ));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_LEN {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

/// Body stream that raises the build's cancel flag once hyper drops it.
struct CancelOnDrop {
    inner: ReceiverStream<Chunk>,
    cancel: CancelFlag,
}

impl Stream for CancelOnDrop {
    type Item = Chunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run `write_archive` on a blocking worker feeding the returned body stream.
///
/// Dropping the stream raises the build's cancel flag and closes the channel,
/// so the worker stops at its next chunk either way.
fn spawn_build(
    plan: ArchivePlan,
    options: ArchiveOptions,
    name: String,
) -> (CancelOnDrop, JoinHandle<catzip_core::Result<ArchiveReport>>) {
    let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
    let cancel = CancelFlag::new();
    let body_cancel = cancel.clone();

    let build = tokio::task::spawn_blocking(move || {
        let sink = ChannelWriter::new(tx.clone());
        let result = write_archive(&plan, sink, &options, &cancel);
        match &result {
            Ok(report) => info!(
                archive = %name,
                entries = report.written(),
                skipped = report.skipped().count(),
                bytes = report.archive_bytes,
                "archive streamed"
            ),
            Err(CatalogError::Cancelled) => debug!(archive = %name, "archive stream cancelled"),
            Err(e) => {
                warn!(archive = %name, error = %e, "archive stream aborted");
                let _ = tx.blocking_send(Err(io::Error::other(e.to_string())));
            }
        }
        result
    });

    let body = CancelOnDrop {
        inner: ReceiverStream::new(rx),
        cancel: body_cancel,
    };
    (body, build)
}

/// Start writing `plan` on a blocking worker and return a streaming response.
///
/// Planning already guaranteed at least one entry, so the 200 is committed
/// before the first byte is produced.
pub fn archive_response(
    plan: ArchivePlan,
    options: ArchiveOptions,
    filename: &str,
) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&disposition::attachment(filename))
        .map_err(|e| ApiError::from(CatalogError::Io(io::Error::other(e))))?;

    let (body, _build) = spawn_build(plan, options, filename.to_string());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
