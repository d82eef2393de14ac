//! Data model for SpaceHound scan results.
//!
//! Re-exports the scan root, item, and snapshot types.

pub mod scan_item;
pub mod scan_root;
pub mod snapshot;

pub use scan_item::ScanItem;
pub use scan_root::{ScanRoot, ScanRootKind};
pub use snapshot::Snapshot;
