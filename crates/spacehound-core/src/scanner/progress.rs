//! Progress reporting — the contract between the traversal engine and
//! whoever is watching it run.

use crate::model::ScanItem;
use crate::model::Snapshot;
use std::path::PathBuf;

/// A progress report, emitted once per discovered node and once per
/// node-level error.
///
/// Counters are running totals for the scan so far; `discovered_item` is
/// `Some` when the event announces a newly recorded node and `None` when
/// it announces an error.
#[derive(Clone, Debug)]
pub struct ProgressEvent {
    pub files_processed: u64,
    pub folders_processed: u64,
    pub bytes_discovered: u64,
    /// Path being processed when the event fired.
    pub current_path: PathBuf,
    /// Directories still waiting on the traversal stack.
    pub queue_depth: usize,
    pub errors_count: usize,
    pub discovered_item: Option<ScanItem>,
}

/// Receiver for [`ProgressEvent`]s.
///
/// Called synchronously, in-line with traversal: a slow sink stalls the
/// scan directly. Sinks must be cheap — buffering and batching are the
/// consumer's job, not the engine's.
pub trait ProgressSink {
    fn report(&mut self, event: &ProgressEvent);
}

/// Any closure over events is a sink; convenient for tests and callers
/// that just collect.
impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards every event, for callers that only want the snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Messages sent from a background scan thread to its consumer.
///
/// Exactly one terminal message (`Completed` or `Cancelled`) is sent per
/// scan, after any number of `Progress` messages.
#[derive(Debug)]
pub enum ScanEvent {
    /// A node was discovered or a node error was recorded.
    Progress(ProgressEvent),
    /// Scan ran to completion; the full result is attached.
    Completed(Box<Snapshot>),
    /// Scan observed a cancellation request. No result exists.
    Cancelled,
}
