//! The traversal engine — an iterative, cancellable, single-threaded walk.
//!
//! An explicit LIFO stack of pending directories replaces recursion, so
//! arbitrarily deep trees cannot exhaust the call stack. Reparse points
//! (symlinks and junctions) are recorded but never descended into, which
//! breaks filesystem cycles and prevents double-counting. Every node-level
//! failure is absorbed into the snapshot's error list; the only condition
//! that crosses the engine boundary is cancellation.

use super::progress::{ProgressEvent, ProgressSink};
use super::rollup::RollupMap;
use crate::model::{ScanItem, ScanRoot, Snapshot};
use crate::path::normalize_path;
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};

/// The scan observed a cancellation request and discarded all partial
/// state. No snapshot exists.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("scan cancelled before completion")]
pub struct ScanCancelled;

/// Walk the subtree under `root`, reporting progress through `sink`.
///
/// Cancellation is checked before every directory pop and before every
/// child entry, so a request is honored within one node's worth of work.
/// All node-level failures end up in [`Snapshot::errors`]; an unreadable
/// root yields a single error and an otherwise-valid empty snapshot.
pub fn scan(
    root: &ScanRoot,
    sink: &mut dyn ProgressSink,
    cancel: &AtomicBool,
) -> Result<Snapshot, ScanCancelled> {
    let started_utc = Utc::now();
    let root_path = normalize_path(&root.path);
    info!("Starting scan of {}", root_path.display());

    let mut state = WalkState::new(root_path);

    loop {
        if cancel.load(Ordering::Relaxed) {
            info!("Scan of {} cancelled", state.root.display());
            return Err(ScanCancelled);
        }
        let Some(current) = state.stack.pop() else {
            break;
        };

        let metadata = match fs::symlink_metadata(&current) {
            Ok(metadata) => metadata,
            Err(err) => {
                // Unreadable or vanished between discovery and pop.
                state.record_error(&current, &err, sink);
                continue;
            }
        };

        let file_type = metadata.file_type();
        if !file_type.is_dir() && !file_type.is_symlink() {
            // The path stopped being a directory (racing delete/recreate),
            // or the caller pointed the scan at a plain file.
            let err = io::Error::other("not a directory");
            state.record_error(&current, &err, sink);
            continue;
        }

        state.folders_processed += 1;
        let directory_item = ScanItem::directory(current.clone(), modified_utc(&metadata));
        state.record_item(directory_item, sink);

        if file_type.is_symlink() {
            // Reparse point: the directory item stands, but its subtree is
            // never enumerated. Cycle-breaking rule.
            debug!("Skipping reparse point {}", current.display());
            continue;
        }

        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) => {
                state.record_error(&current, &err, sink);
                continue;
            }
        };

        for entry in entries {
            if cancel.load(Ordering::Relaxed) {
                info!("Scan of {} cancelled", state.root.display());
                return Err(ScanCancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    state.record_error(&current, &err, sink);
                    continue;
                }
            };

            let entry_path = entry.path();
            let entry_type = match entry.file_type() {
                Ok(entry_type) => entry_type,
                Err(err) => {
                    state.record_error(&entry_path, &err, sink);
                    continue;
                }
            };

            if entry_type.is_dir() {
                state.stack.push(entry_path);
            } else if entry_type.is_file() {
                match entry.metadata() {
                    Ok(metadata) => state.record_file(entry_path, &metadata, sink),
                    Err(err) => state.record_error(&entry_path, &err, sink),
                }
            } else if entry_type.is_symlink() {
                // The target's metadata decides directory-vs-file only.
                // Directory links go on the stack so they are recorded (and
                // skipped) as reparse points; file links and dangling links
                // contribute nothing.
                if let Ok(target) = fs::metadata(&entry_path) {
                    if target.is_dir() {
                        state.stack.push(entry_path);
                    }
                }
            }
            // Sockets, FIFOs, devices: not part of the usage model.
        }
    }

    debug!(
        "Scan walk complete: {} files, {} folders, {} bytes, {} errors",
        state.files_processed,
        state.folders_processed,
        state.bytes_discovered,
        state.errors.len()
    );

    Ok(state.assemble(root, started_utc))
}

/// All per-scan state: the pending stack, the item arena, the rollup map,
/// the error list, and the running counters. Dropped wholesale on
/// cancellation; nothing survives a scan except the returned snapshot.
struct WalkState {
    root: PathBuf,
    stack: Vec<PathBuf>,
    items: Vec<ScanItem>,
    errors: Vec<String>,
    rollup: RollupMap,
    files_processed: u64,
    folders_processed: u64,
    bytes_discovered: u64,
}

impl WalkState {
    fn new(root: PathBuf) -> Self {
        Self {
            stack: vec![root.clone()],
            root,
            items: Vec::new(),
            errors: Vec::new(),
            rollup: RollupMap::new(),
            files_processed: 0,
            folders_processed: 0,
            bytes_discovered: 0,
        }
    }

    /// Record a successfully sized file: item, counters, rollup, event.
    fn record_file(&mut self, path: PathBuf, metadata: &fs::Metadata, sink: &mut dyn ProgressSink) {
        let size = metadata.len();
        self.files_processed += 1;
        self.bytes_discovered += size;
        self.rollup.record(&path, size, &self.root);
        self.record_item(ScanItem::file(path, size, modified_utc(metadata)), sink);
    }

    /// Append an item in discovery order and emit the event carrying it.
    fn record_item(&mut self, item: ScanItem, sink: &mut dyn ProgressSink) {
        let event = ProgressEvent {
            files_processed: self.files_processed,
            folders_processed: self.folders_processed,
            bytes_discovered: self.bytes_discovered,
            current_path: item.path.clone(),
            queue_depth: self.stack.len(),
            errors_count: self.errors.len(),
            discovered_item: Some(item.clone()),
        };
        self.items.push(item);
        sink.report(&event);
    }

    /// Absorb a node-level failure: error list entry plus an item-less event.
    fn record_error(&mut self, path: &Path, err: &io::Error, sink: &mut dyn ProgressSink) {
        debug!("Node error at {}: {err}", path.display());
        self.errors.push(format!("{}: {err}", path.display()));
        let event = ProgressEvent {
            files_processed: self.files_processed,
            folders_processed: self.folders_processed,
            bytes_discovered: self.bytes_discovered,
            current_path: path.to_path_buf(),
            queue_depth: self.stack.len(),
            errors_count: self.errors.len(),
            discovered_item: None,
        };
        sink.report(&event);
    }

    /// Snapshot assembly: patch directory sizes from the rollup map in one
    /// pass (directories absent from the map — empty, reparse points,
    /// all-files-failed — keep size zero), then package the immutable
    /// result.
    fn assemble(self, root: &ScanRoot, started_utc: DateTime<Utc>) -> Snapshot {
        let WalkState {
            mut items,
            errors,
            rollup,
            ..
        } = self;

        for item in items.iter_mut().filter(|item| item.is_directory) {
            if let Some(total) = rollup.total_for(&item.path) {
                item.size_bytes = total;
            }
        }

        // Sum file items rather than reuse the running counter: the sum is
        // the defining quantity, the counter merely tracks it.
        let total_bytes = items
            .iter()
            .filter(|item| !item.is_directory)
            .map(|item| item.size_bytes)
            .sum();

        Snapshot {
            root: root.clone(),
            started_utc,
            completed_utc: Utc::now(),
            items,
            total_bytes,
            errors,
        }
    }
}

fn modified_utc(metadata: &fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}
