//! Background attachment-preview fetching.
//!
//! Fetches run on worker threads and never touch rows. Each request carries
//! the [`BindingTicket`] of the row it was issued for; results travel back
//! over a channel and the rendering thread re-checks the ticket before
//! applying them.

use crate::model::MessageId;
use crate::row::BindingTicket;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Produces preview text for an attachment.
pub trait PreviewSource: Send + Sync {
    /// Blocking fetch of a short preview for `attachment`.
    fn fetch(&self, attachment: &str) -> String;
}

/// Preview source that describes attachments by file type after a fixed
/// delay, standing in for a remote file service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedPreviewSource {
    delay: Duration,
}

impl DelayedPreviewSource {
    /// Source answering after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PreviewSource for DelayedPreviewSource {
    fn fetch(&self, attachment: &str) -> String {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        describe_attachment(attachment).to_string()
    }
}

/// Human-readable file kind derived from the attachment extension.
pub fn describe_attachment(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "heic") => "image",
        Some("mp4" | "mov" | "webm") => "video",
        Some("mp3" | "wav" | "ogg" | "m4a") => "audio",
        Some("pdf" | "doc" | "docx" | "odt" | "txt" | "md") => "document",
        Some("zip" | "tar" | "gz") => "archive",
        _ => "file",
    }
}

/// A preview to fetch for the row holding `ticket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRequest {
    /// Binding the request was issued for.
    pub ticket: BindingTicket,
    /// Message owning the attachment.
    pub message_id: MessageId,
    /// Attachment name.
    pub attachment: String,
}

/// A completed preview fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillResult {
    /// Binding the request was issued for.
    pub ticket: BindingTicket,
    /// Message owning the attachment.
    pub message_id: MessageId,
    /// Preview text.
    pub text: String,
}

/// Runs preview fetches off the rendering thread.
pub struct PreviewFetcher {
    source: Arc<dyn PreviewSource>,
    tx: Sender<FillResult>,
    rx: Receiver<FillResult>,
    in_flight: usize,
}

impl std::fmt::Debug for PreviewFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewFetcher")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl PreviewFetcher {
    /// Fetcher backed by `source`.
    pub fn new(source: Arc<dyn PreviewSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start fetching a preview on a worker thread.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the worker thread could not be spawned; the
    /// request is then dropped and the caller may retry it later.
    pub fn request(&mut self, request: FillRequest) -> io::Result<()> {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let FillRequest {
            ticket,
            message_id,
            attachment,
        } = request;
        debug!(position = %ticket.position(), %attachment, "Requesting preview");

        thread::Builder::new()
            .name("preview-fetch".to_string())
            .spawn(move || {
                let text = source.fetch(&attachment);
                // Receiver gone means the app is shutting down.
                let _ = tx.send(FillResult {
                    ticket,
                    message_id,
                    text,
                });
            })?;

        self.in_flight += 1;
        Ok(())
    }

    /// All results that completed since the last call. Never blocks.
    pub fn drain(&mut self) -> Vec<FillResult> {
        let results: Vec<FillResult> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(results.len());
        results
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<FillResult> {
        let result = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(result)
    }

    /// Requests whose results were not collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
