//! SpaceHound Store — SQLite persistence for completed scan snapshots.
//!
//! The engine produces a [`Snapshot`] value and knows nothing about
//! storage; this crate is the collaborator that keeps a history of
//! completed scans. One summary row per snapshot, one row per item,
//! written in a single transaction with a reused prepared statement.
//!
//! What is persisted mirrors what a history view needs: completion time,
//! root, totals, and every item. The error list and the start time are
//! scan-session detail and are not stored; a loaded snapshot reports its
//! completion time for both.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use rusqlite::{params, Connection, OptionalExtension};
use spacehound_core::{ScanItem, ScanRoot, ScanRootKind, Snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Schema, applied idempotently on open.
///
/// `INTEGER PRIMARY KEY` without `AUTOINCREMENT`: ids are still
/// auto-assigned, without the `sqlite_sequence` bookkeeping overhead.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY,
    completed_utc TEXT NOT NULL,
    root_path TEXT NOT NULL,
    root_kind TEXT NOT NULL,
    total_bytes INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS snapshot_items (
    id INTEGER PRIMARY KEY,
    snapshot_id INTEGER NOT NULL,
    path TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    is_directory INTEGER NOT NULL,
    extension TEXT NOT NULL,
    modified_utc TEXT NOT NULL,
    FOREIGN KEY (snapshot_id) REFERENCES snapshots(id)
);

CREATE INDEX IF NOT EXISTS idx_snapshot_items_snapshot_id
ON snapshot_items (snapshot_id);
";

/// Errors surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored timestamp column failed to parse as RFC 3339.
    #[error("invalid timestamp '{value}' in stored snapshot")]
    Timestamp { value: String },
}

/// One row of the scan history list, newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub id: i64,
    pub completed_utc: DateTime<Utc>,
    pub root_path: PathBuf,
    pub total_bytes: u64,
}

/// SQLite-backed snapshot history.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) a store at `path`, creating parent directories as
    /// needed and applying the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::initialize(Connection::open(path)?)
    }

    /// Open a transient in-memory store. Used by tests and previews.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Persist a completed snapshot; returns its generated id.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<i64, StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO snapshots (completed_utc, root_path, root_kind, total_bytes)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                snapshot.completed_utc.to_rfc3339(),
                snapshot.root.path.to_string_lossy().into_owned(),
                snapshot.root.kind.as_str(),
                snapshot.total_bytes as i64,
            ],
        )?;
        let snapshot_id = tx.last_insert_rowid();

        {
            let mut insert_item = tx.prepare(
                "INSERT INTO snapshot_items
                 (snapshot_id, path, size_bytes, is_directory, extension, modified_utc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for item in &snapshot.items {
                insert_item.execute(params![
                    snapshot_id,
                    item.path.to_string_lossy().into_owned(),
                    item.size_bytes as i64,
                    item.is_directory,
                    item.extension.as_deref().unwrap_or(""),
                    item.modified_utc
                        .map(|modified| modified.to_rfc3339())
                        .unwrap_or_default(),
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            "Saved snapshot {snapshot_id}: {} items for {}",
            snapshot.items.len(),
            snapshot.root.path.display()
        );
        Ok(snapshot_id)
    }

    /// Summaries of every stored snapshot, ordered by completion time
    /// descending.
    pub fn list(&self) -> Result<Vec<SnapshotSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, completed_utc, root_path, total_bytes
             FROM snapshots
             ORDER BY completed_utc DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, completed, root_path, total_bytes) = row?;
            summaries.push(SnapshotSummary {
                id,
                completed_utc: parse_utc(&completed)?,
                root_path: PathBuf::from(root_path),
                total_bytes: total_bytes as u64,
            });
        }
        Ok(summaries)
    }

    /// Reconstruct a full snapshot by id, or `None` if no such row exists.
    pub fn load(&self, snapshot_id: i64) -> Result<Option<Snapshot>, StoreError> {
        let header = self
            .conn
            .query_row(
                "SELECT root_kind, root_path, completed_utc, total_bytes
                 FROM snapshots
                 WHERE id = ?1",
                params![snapshot_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((kind, root_path, completed, total_bytes)) = header else {
            return Ok(None);
        };
        let completed_utc = parse_utc(&completed)?;

        let mut stmt = self.conn.prepare(
            "SELECT path, size_bytes, is_directory, extension, modified_utc
             FROM snapshot_items
             WHERE snapshot_id = ?1",
        )?;
        let rows = stmt.query_map(params![snapshot_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (path, size_bytes, is_directory, extension, modified) = row?;
            let modified_utc = if modified.is_empty() {
                None
            } else {
                Some(parse_utc(&modified)?)
            };
            items.push(ScanItem {
                path: PathBuf::from(path),
                is_directory,
                size_bytes: size_bytes as u64,
                extension: if extension.is_empty() {
                    None
                } else {
                    Some(CompactString::new(&extension))
                },
                modified_utc,
            });
        }

        debug!("Loaded snapshot {snapshot_id}: {} items", items.len());
        Ok(Some(Snapshot {
            root: ScanRoot {
                kind: ScanRootKind::from_label(&kind),
                path: PathBuf::from(root_path),
            },
            started_utc: completed_utc,
            completed_utc,
            items,
            total_bytes: total_bytes as u64,
            errors: Vec::new(),
        }))
    }
}

fn parse_utc(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    fn sample_snapshot(completed: &str) -> Snapshot {
        let completed = at(completed);
        Snapshot {
            root: ScanRoot::folder("/data"),
            started_utc: completed,
            completed_utc: completed,
            items: vec![
                ScanItem {
                    path: PathBuf::from("/data"),
                    is_directory: true,
                    size_bytes: 300,
                    extension: None,
                    modified_utc: Some(at("2026-08-01T08:00:00Z")),
                },
                ScanItem {
                    path: PathBuf::from("/data/a.txt"),
                    is_directory: false,
                    size_bytes: 100,
                    extension: Some(CompactString::new("txt")),
                    modified_utc: Some(at("2026-08-01T08:00:00Z")),
                },
                ScanItem {
                    path: PathBuf::from("/data/b"),
                    is_directory: false,
                    size_bytes: 200,
                    extension: None,
                    modified_utc: None,
                },
            ],
            total_bytes: 300,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_save_persists_metadata_and_items() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let snapshot = sample_snapshot("2026-08-07T12:00:00Z");

        let id = store.save(&snapshot).unwrap();

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].root_path, PathBuf::from("/data"));
        assert_eq!(summaries[0].total_bytes, 300);
        assert_eq!(summaries[0].completed_utc, at("2026-08-07T12:00:00Z"));

        let loaded = store.load(id).unwrap().expect("snapshot must exist");
        assert_eq!(loaded.items.len(), 3);
        assert_eq!(loaded.total_bytes, 300);
        assert_eq!(loaded.root.kind, ScanRootKind::Folder);
        assert!(loaded
            .items
            .iter()
            .any(|item| item.path.ends_with("a.txt")));
    }

    #[test]
    fn test_item_fields_round_trip() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let snapshot = sample_snapshot("2026-08-07T12:00:00Z");
        let id = store.save(&snapshot).unwrap();

        let loaded = store.load(id).unwrap().unwrap();
        // Items round-trip field for field; the store does not reorder.
        assert_eq!(loaded.items, snapshot.items);
    }

    #[test]
    fn test_empty_extension_and_modified_load_as_none() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let id = store.save(&sample_snapshot("2026-08-07T12:00:00Z")).unwrap();

        let loaded = store.load(id).unwrap().unwrap();
        let bare = loaded
            .items
            .iter()
            .find(|item| item.path.ends_with("b"))
            .unwrap();
        assert_eq!(bare.extension, None);
        assert_eq!(bare.modified_utc, None);
    }

    #[test]
    fn test_list_orders_newest_first() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let older = store.save(&sample_snapshot("2026-08-01T00:00:00Z")).unwrap();
        let newest = store.save(&sample_snapshot("2026-08-07T00:00:00Z")).unwrap();
        let middle = store.save(&sample_snapshot("2026-08-03T00:00:00Z")).unwrap();

        let ids: Vec<i64> = store.list().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newest, middle, older]);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let store = SnapshotStore::open_in_memory().unwrap();
        assert!(store.load(42).unwrap().is_none());
    }

    #[test]
    fn test_drive_root_kind_round_trips() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut snapshot = sample_snapshot("2026-08-07T12:00:00Z");
        snapshot.root = ScanRoot::drive("/");
        let id = store.save(&snapshot).unwrap();

        let loaded = store.load(id).unwrap().unwrap();
        assert_eq!(loaded.root.kind, ScanRootKind::Drive);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("nested").join("history").join("scans.db");

        let mut store = SnapshotStore::open(&db_path).unwrap();
        let id = store.save(&sample_snapshot("2026-08-07T12:00:00Z")).unwrap();
        drop(store);

        // Reopen from disk and read back.
        let store = SnapshotStore::open(&db_path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.load(id).unwrap().is_some());
    }
}
