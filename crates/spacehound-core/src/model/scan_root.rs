//! The root a scan starts from — a whole drive or a single folder.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whether the scan root is a drive/volume or an ordinary folder.
///
/// The engine treats both identically; the distinction is carried through
/// so that consumers (history views, stores) can label results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanRootKind {
    Drive,
    Folder,
}

impl ScanRootKind {
    /// Stable label used by stores and display layers.
    pub fn as_str(self) -> &'static str {
        match self {
            ScanRootKind::Drive => "Drive",
            ScanRootKind::Folder => "Folder",
        }
    }

    /// Parse a label produced by [`as_str`](Self::as_str).
    /// Unknown labels fall back to `Folder`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Drive" => ScanRootKind::Drive,
            _ => ScanRootKind::Folder,
        }
    }
}

/// Immutable description of what to scan, supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    pub kind: ScanRootKind,
    pub path: PathBuf,
}

impl ScanRoot {
    /// A root covering an entire drive or volume.
    pub fn drive(path: impl AsRef<Path>) -> Self {
        Self {
            kind: ScanRootKind::Drive,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// A root covering a single folder subtree.
    pub fn folder(path: impl AsRef<Path>) -> Self {
        Self {
            kind: ScanRootKind::Folder,
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_label_round_trip() {
        assert_eq!(ScanRootKind::from_label("Drive"), ScanRootKind::Drive);
        assert_eq!(ScanRootKind::from_label("Folder"), ScanRootKind::Folder);
        assert_eq!(
            ScanRootKind::from_label(ScanRootKind::Drive.as_str()),
            ScanRootKind::Drive
        );
    }

    #[test]
    fn test_unknown_label_falls_back_to_folder() {
        assert_eq!(ScanRootKind::from_label("Junction"), ScanRootKind::Folder);
    }

    #[test]
    fn test_constructors() {
        let root = ScanRoot::drive("/");
        assert_eq!(root.kind, ScanRootKind::Drive);
        let root = ScanRoot::folder("/home");
        assert_eq!(root.kind, ScanRootKind::Folder);
        assert_eq!(root.path, PathBuf::from("/home"));
    }
}
