//! The immutable result of one completed scan.

use super::{ScanItem, ScanRoot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything one scan produced.
///
/// Items appear in discovery order. `total_bytes` sums file items only —
/// directory totals are derived from the same files, so the root
/// directory's rolled-up size equals `total_bytes` (an invariant the test
/// suite checks rather than something the assembler relies on).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: ScanRoot,
    pub started_utc: DateTime<Utc>,
    pub completed_utc: DateTime<Utc>,
    pub items: Vec<ScanItem>,
    pub total_bytes: u64,
    /// One `"path: message"` entry per node-level access failure.
    pub errors: Vec<String>,
}

impl Snapshot {
    /// Iterator over file items only.
    pub fn files(&self) -> impl Iterator<Item = &ScanItem> {
        self.items.iter().filter(|item| !item.is_directory)
    }

    /// Iterator over directory items only.
    pub fn directories(&self) -> impl Iterator<Item = &ScanItem> {
        self.items.iter().filter(|item| item.is_directory)
    }
}
