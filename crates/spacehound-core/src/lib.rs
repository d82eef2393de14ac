//! SpaceHound Core — disk-usage scanning engine and data model.
//!
//! This crate contains all scan logic with zero UI or storage
//! dependencies. It is designed to be reusable across different frontends
//! and persistence layers.
//!
//! # Modules
//!
//! - [`model`] — Scan roots, items, and the immutable snapshot.
//! - [`path`] — Lexical path normalization for ancestor bookkeeping.
//! - [`scanner`] — The iterative traversal engine, rollup accumulator,
//!   progress contract, and background-thread orchestration.

pub mod model;
pub mod path;
pub mod scanner;

pub use model::{ScanItem, ScanRoot, ScanRootKind, Snapshot};
pub use scanner::{
    scan, start_scan, ProgressEvent, ProgressSink, ScanCancelled, ScanEvent, ScanHandle,
};
