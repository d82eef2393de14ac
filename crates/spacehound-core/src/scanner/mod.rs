//! Scanner module — the traversal engine and its orchestration.
//!
//! [`scan`] is the synchronous engine: one thread, one root, one snapshot.
//! [`start_scan`] wraps it for callers that must stay responsive (a UI, a
//! service loop): it runs the engine on a named background thread and
//! streams [`ScanEvent`]s over a bounded channel, with cooperative
//! cancellation through the returned handle.

pub mod progress;
pub mod rollup;
pub mod walk;

pub use progress::{NullSink, ProgressEvent, ProgressSink, ScanEvent};
pub use rollup::RollupMap;
pub use walk::{scan, ScanCancelled};

use crate::model::ScanRoot;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

/// Maximum number of events that may queue up in the channel.
///
/// The engine emits one event per node and blocks on `send` when the
/// buffer is full, so a consumer that falls behind back-pressures the scan
/// instead of the channel consuming unbounded heap. A consumer draining
/// once per frame has thousands of events of headroom.
pub const EVENT_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running scan: receive events, request cancellation.
///
/// Handles are fully independent — two concurrent scans share no stack,
/// accumulator, or error list, so no synchronization exists between them.
pub struct ScanHandle {
    /// Receiver for progress and terminal events from the scan thread.
    pub events: Receiver<ScanEvent>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a scan on a background thread.
///
/// Exactly one terminal event arrives per scan: `Completed` with the full
/// snapshot, or `Cancelled` with nothing — a cancelled scan leaks no
/// partial result.
pub fn start_scan(root: ScanRoot) -> ScanHandle {
    let (event_tx, event_rx) = crossbeam_channel::bounded::<ScanEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("spacehound-scanner".into())
        .spawn(move || {
            let mut sink = ChannelSink {
                events: event_tx.clone(),
            };
            match walk::scan(&root, &mut sink, &cancel_clone) {
                Ok(snapshot) => {
                    info!(
                        "Scan of {} completed: {} items, {} bytes",
                        root.path.display(),
                        snapshot.items.len(),
                        snapshot.total_bytes
                    );
                    let _ = event_tx.send(ScanEvent::Completed(Box::new(snapshot)));
                }
                Err(ScanCancelled) => {
                    let _ = event_tx.send(ScanEvent::Cancelled);
                }
            }
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        events: event_rx,
        cancel_flag,
        _thread: Some(thread),
    }
}

/// Sink that forwards every event into the bounded channel.
///
/// A dropped receiver turns sends into no-ops; the scan simply runs to
/// completion unobserved (or until its handle cancels it).
struct ChannelSink {
    events: Sender<ScanEvent>,
}

impl ProgressSink for ChannelSink {
    fn report(&mut self, event: &ProgressEvent) {
        let _ = self.events.send(ScanEvent::Progress(event.clone()));
    }
}
