//! A single discovered file or directory.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One node recorded during a scan.
///
/// File items are complete at creation. Directory items are recorded with
/// `size_bytes == 0` during traversal and patched exactly once when the
/// snapshot is assembled — directory sizes only ever come from the rollup
/// map, never from traversal itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanItem {
    /// Full normalized path of the node.
    pub path: PathBuf,

    /// `true` for directory nodes (including reparse-point directories).
    pub is_directory: bool,

    /// File size in bytes; for directories, the cumulative size of all
    /// files nested beneath them after assembly.
    pub size_bytes: u64,

    /// Bare extension without the dot (`"txt"`). `None` for directories
    /// and for files without an extension.
    pub extension: Option<CompactString>,

    /// Last modification time. `None` only when the platform cannot
    /// report one.
    pub modified_utc: Option<DateTime<Utc>>,
}

impl ScanItem {
    /// Create a directory item. Size starts at zero and is patched once
    /// at snapshot assembly.
    pub fn directory(path: PathBuf, modified_utc: Option<DateTime<Utc>>) -> Self {
        Self {
            path,
            is_directory: true,
            size_bytes: 0,
            extension: None,
            modified_utc,
        }
    }

    /// Create a file item, deriving the extension from the path.
    pub fn file(path: PathBuf, size_bytes: u64, modified_utc: Option<DateTime<Utc>>) -> Self {
        let extension = extension_of(&path);
        Self {
            path,
            is_directory: false,
            size_bytes,
            extension,
            modified_utc,
        }
    }
}

/// Extract the bare extension of a file path, if any.
fn extension_of(path: &Path) -> Option<CompactString> {
    path.extension()
        .map(|ext| CompactString::new(ext.to_string_lossy()))
}
