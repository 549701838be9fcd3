//! Session log (spec §4.4.1): an append-or-patch row store scoped to one
//! run, backed by `data/sessions/{session_id}/session.csv` plus a sibling
//! `metadata.json`.

use crate::columns::{reel_to_row, row_to_reel, Row};
use crate::csvfile::{read_rows, widen_header, write_rows};
use chrono::{DateTime, Utc};
use reelscout_core::error::{Error, Result};
use reelscout_core::model::Reel;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Metadata recorded once per session at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMetadata {
    /// The keyword this session was run for.
    pub keyword: String,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// A snapshot of the tunable configuration in effect (opaque to the
    /// store; the CLI decides what goes in here).
    pub config_snapshot: serde_json::Value,
}

/// A single session's row log. Holds an in-memory index keyed by URL,
/// ordered by first discovery, flushed to disk after every upsert batch.
pub struct SessionLog {
    session_dir: PathBuf,
    header: Vec<String>,
    order: Vec<String>,
    index: HashMap<String, Reel>,
}

impl SessionLog {
    /// Path to the CSV file within a session directory.
    fn csv_path(session_dir: &Path) -> PathBuf {
        session_dir.join("session.csv")
    }

    /// Create a new, empty session directory with its metadata file.
    pub fn create(session_dir: impl Into<PathBuf>, metadata: &SessionMetadata) -> Result<Self> {
        let session_dir = session_dir.into();
        std::fs::create_dir_all(&session_dir)
            .map_err(|e| Error::invalid_response(format!("creating {session_dir:?}: {e}")))?;
        let metadata_path = session_dir.join("metadata.json");
        let body = serde_json::to_vec_pretty(metadata)
            .map_err(|e| Error::invalid_response(format!("serializing metadata: {e}")))?;
        std::fs::write(&metadata_path, body)
            .map_err(|e| Error::invalid_response(format!("writing {metadata_path:?}: {e}")))?;

        Ok(Self {
            session_dir,
            header: widen_header(&[]),
            order: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Reopen an existing session directory, loading whatever rows its
    /// `session.csv` already carries.
    pub fn open(session_dir: impl Into<PathBuf>) -> Result<Self> {
        let session_dir = session_dir.into();
        let (existing_header, rows) = read_rows(&Self::csv_path(&session_dir))?;
        let header = widen_header(&existing_header);
        let now = Utc::now();
        let mut order = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());
        for row in rows {
            let reel = row_to_reel(&row, now);
            order.push(reel.url.clone());
            index.insert(reel.url.clone(), reel);
        }
        Ok(Self {
            session_dir,
            header,
            order,
            index,
        })
    }

    /// Number of distinct URLs currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the log has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All rows currently held, in first-discovery order.
    #[must_use]
    pub fn rows(&self) -> Vec<Reel> {
        self.order
            .iter()
            .filter_map(|url| self.index.get(url).cloned())
            .collect()
    }

    /// Look up one row by URL.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&Reel> {
        self.index.get(url)
    }

    /// Insert a freshly-discovered row, or apply it as a patch onto an
    /// existing one (append-or-patch, spec §4.4.1). Does not flush to disk.
    pub fn upsert(&mut self, incoming: Reel, now: DateTime<Utc>) {
        match self.index.get_mut(&incoming.url) {
            Some(existing) => existing.merge_from(&incoming, now),
            None => {
                self.order.push(incoming.url.clone());
                self.index.insert(incoming.url.clone(), incoming);
            }
        }
    }

    /// Upsert a whole batch and flush once.
    pub fn upsert_batch(&mut self, incoming: impl IntoIterator<Item = Reel>, now: DateTime<Utc>) -> Result<()> {
        for reel in incoming {
            self.upsert(reel, now);
        }
        self.flush()
    }

    /// Write the full in-memory index back to `session.csv`.
    pub fn flush(&mut self) -> Result<()> {
        for reel in self.index.values() {
            let row = reel_to_row(reel);
            for column in row.keys() {
                if !self.header.iter().any(|h| h == column) {
                    self.header.push(column.clone());
                }
            }
        }
        let rows: Vec<Row> = self
            .order
            .iter()
            .filter_map(|url| self.index.get(url).map(reel_to_row))
            .collect();
        write_rows(&Self::csv_path(&self.session_dir), &self.header, &rows)
    }

    /// Directory this session is rooted at.
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> SessionMetadata {
        SessionMetadata {
            keyword: "airpods pro".to_string(),
            started_at: Utc::now(),
            config_snapshot: serde_json::json!({"parallel": 4}),
        }
    }

    #[test]
    fn upsert_inserts_then_patches_without_erasing() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::create(dir.path().join("s1"), &metadata()).unwrap();
        let now = Utc::now();

        let mut discovered = Reel::discovered("https://www.instagram.com/reel/Cabc", "airpods", now);
        discovered.views = Some(10);
        log.upsert(discovered, now);

        let mut patch = Reel::discovered("https://www.instagram.com/reel/Cabc", "airpods", now);
        patch.views = None;
        patch.owner_handle = Some("creator".to_string());
        log.upsert(patch, now);

        assert_eq!(log.len(), 1);
        let row = log.get("https://www.instagram.com/reel/Cabc").unwrap();
        assert_eq!(row.views, Some(10));
        assert_eq!(row.owner_handle.as_deref(), Some("creator"));
    }

    #[test]
    fn flush_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("s1");
        let now = Utc::now();
        {
            let mut log = SessionLog::create(&session_dir, &metadata()).unwrap();
            let reel = Reel::discovered("https://www.instagram.com/reel/Cabc", "airpods", now);
            log.upsert_batch([reel], now).unwrap();
        }
        let reopened = SessionLog::open(&session_dir).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get("https://www.instagram.com/reel/Cabc").is_some());
    }

    #[test]
    fn accepted_status_never_downgrades_within_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::create(dir.path().join("s1"), &metadata()).unwrap();
        let now = Utc::now();

        let mut accepted = Reel::discovered("https://www.instagram.com/reel/Cabc", "airpods", now);
        accepted.status = reelscout_core::model::Status::Accepted;
        log.upsert(accepted, now);

        let rejected = Reel::discovered("https://www.instagram.com/reel/Cabc", "airpods", now);
        log.upsert(rejected, now);

        assert_eq!(
            log.get("https://www.instagram.com/reel/Cabc").unwrap().status,
            reelscout_core::model::Status::Accepted
        );
    }
}
