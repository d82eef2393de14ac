//! Bottom-up accumulation of file sizes into ancestor directory totals.

use crate::path::normalize_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Map from normalized directory path to the cumulative bytes of every
/// file discovered beneath it.
///
/// This is the only producer of directory totals: the traversal records
/// directory items with size zero, and the snapshot assembler patches them
/// from this map in one pass. The map lives for a single scan and is
/// discarded with it.
#[derive(Debug, Default)]
pub struct RollupMap {
    totals: HashMap<PathBuf, u64>,
}

impl RollupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `file_size` to every ancestor of `file_path`, from its
    /// immediate parent up to and including `root`.
    ///
    /// `root` must already be normalized. The walk stops once the root has
    /// been credited, once an ancestor falls outside the root (component-wise
    /// `starts_with`, so `/data/abc` is never mistaken for an ancestor match
    /// of `/data/ab`), or once no parent remains.
    pub fn record(&mut self, file_path: &Path, file_size: u64, root: &Path) {
        let Some(parent) = file_path.parent() else {
            return;
        };

        let mut current = normalize_path(parent);
        loop {
            if !current.starts_with(root) {
                break;
            }

            *self.totals.entry(current.clone()).or_insert(0) += file_size;

            if current == root {
                break;
            }
            match current.parent() {
                Some(next) => current = next.to_path_buf(),
                None => break,
            }
        }
    }

    /// Cumulative total for a normalized directory path, if any file was
    /// recorded beneath it.
    pub fn total_for(&self, path: &Path) -> Option<u64> {
        self.totals.get(path).copied()
    }

    /// Number of directories with at least one recorded file beneath them.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
