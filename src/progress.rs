//! Workbook write progress (spec §4.6, §5).
//!
//! Grounded on spec.md's explicit redesign instruction: the progress channel
//! is a bounded observer list rather than a sendable-constrained broadcast
//! channel. `Book::subscribe` registers a `std::sync::mpsc::SyncSender`; the
//! orchestrator pushes with `try_send`, tolerating a full or disconnected
//! receiver (spec.md's "consumers absent is fine" rule). No broadcast-channel
//! crate is introduced; nothing in the corpus reaches for one for this kind
//! of fan-out.

use std::sync::mpsc::{self, Receiver, SyncSender};

/// Why a write failed, as reported through the progress channel. Mirrors
/// the taxonomy in `error::XlsxError` without carrying the error itself
/// (subscribers get a description; the caller of `write`/`write_async`
/// gets the real `Result`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    FileWrite,
    DataProvider,
    XmlGeneration,
    Encoding,
    XmlValidation,
    Cancelled,
    Io,
}

impl FailureKind {
    pub fn from_error(error: &crate::error::XlsxError) -> Self {
        use crate::error::XlsxError;
        match error {
            XlsxError::FileWrite(_) => FailureKind::FileWrite,
            XlsxError::DataProvider { .. } => FailureKind::DataProvider,
            XlsxError::XmlGeneration(_) => FailureKind::XmlGeneration,
            XlsxError::Encoding(_) => FailureKind::Encoding,
            XlsxError::XmlValidation { .. } => FailureKind::XmlValidation,
            XlsxError::Cancelled => FailureKind::Cancelled,
            XlsxError::Io(_) => FailureKind::Io,
        }
    }
}

/// One lifecycle event emitted during `Book::write`/`write_async` (spec §4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A sheet's data is about to be loaded and resolved.
    SheetStart {
        sheet_index: usize,
        sheet_count: usize,
        sheet_name: String,
        progress_percentage: f64,
    },
    /// A sheet's worksheet XML part has been fully assembled.
    SheetDone {
        sheet_index: usize,
        sheet_count: usize,
        sheet_name: String,
        progress_percentage: f64,
    },
    /// Every sheet is done; the workbook-wide parts (styles, shared
    /// strings, workbook.xml, docProps, content types) are being built.
    GlobalPartsStart { progress_percentage: f64 },
    /// The package has been assembled and written to disk.
    Finished,
    /// The write failed; no file was left in place.
    Failed(FailureKind),
}

impl ProgressEvent {
    /// A short, human-readable line, for callers using `Logger` instead of
    /// the typed channel.
    pub fn description(&self) -> String {
        match self {
            ProgressEvent::SheetStart {
                sheet_name,
                sheet_index,
                sheet_count,
                ..
            } => format!(
                "starting sheet '{sheet_name}' ({}/{sheet_count})",
                sheet_index + 1
            ),
            ProgressEvent::SheetDone {
                sheet_name,
                sheet_index,
                sheet_count,
                ..
            } => format!(
                "finished sheet '{sheet_name}' ({}/{sheet_count})",
                sheet_index + 1
            ),
            ProgressEvent::GlobalPartsStart { .. } => {
                "assembling workbook-wide parts".to_string()
            }
            ProgressEvent::Finished => "workbook written".to_string(),
            ProgressEvent::Failed(kind) => format!("write failed: {kind:?}"),
        }
    }

    pub fn progress_percentage(&self) -> f64 {
        match self {
            ProgressEvent::SheetStart {
                progress_percentage,
                ..
            }
            | ProgressEvent::SheetDone {
                progress_percentage,
                ..
            }
            | ProgressEvent::GlobalPartsStart {
                progress_percentage,
            } => *progress_percentage,
            ProgressEvent::Finished => 1.0,
            ProgressEvent::Failed(_) => 0.0,
        }
    }
}

/// The observer list a `Book` pushes progress events to. Multiple
/// subscribers may register; each gets its own bounded channel and a slow
/// or dropped subscriber never blocks the writer.
#[derive(Default)]
pub struct ProgressBroadcaster {
    subscribers: Vec<SyncSender<ProgressEvent>>,
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        ProgressBroadcaster::default()
    }

    /// Register a new subscriber with the given bounded channel capacity.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<ProgressEvent> {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        self.subscribers.push(sender);
        receiver
    }

    /// Push `event` to every subscriber, dropping it for any subscriber
    /// whose buffer is full or who has disconnected.
    pub fn publish(&self, event: ProgressEvent) {
        for subscriber in &self.subscribers {
            let _ = subscriber.try_send(event.clone());
        }
    }
}
