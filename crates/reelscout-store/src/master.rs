//! Master merger (spec §4.4.2): a single-writer, file-locked merge of one
//! session's rows into the cross-session `data/master.csv`.

use crate::columns::{reel_to_row, row_to_reel, Row};
use crate::csvfile::{read_rows, widen_header, write_rows};
use chrono::Utc;
use fs4::FileExt;
use reelscout_core::error::{Error, Result};
use reelscout_core::model::Reel;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const LOCK_RETRIES: u32 = 3;
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Merge one row from `incoming` into `base`. Whichever row was updated
/// later acts as the base the earlier one patches onto, so `status` can
/// only ever advance and non-null fields are never clobbered by a stale
/// write (spec §4.4.2: "most recent `row_updated_at` wins per column, but
/// null values never overwrite non-null").
#[must_use]
fn merge_rows(base: &Reel, incoming: &Reel) -> Reel {
    let (older, newer) = if base.row_updated_at <= incoming.row_updated_at {
        (base, incoming)
    } else {
        (incoming, base)
    };
    let mut merged = older.clone();
    merged.merge_from(newer, newer.row_updated_at);
    merged.row_created_at = base.row_created_at.min(incoming.row_created_at);
    merged
}

/// Acquire an exclusive lock on `path`, creating it if absent. `lock_exclusive`
/// itself blocks until granted, so each retry attempt is bounded by running
/// it on a helper thread and waiting only [`LOCK_TIMEOUT`]`/`[`LOCK_RETRIES`]
/// before giving up and trying again, up to [`LOCK_RETRIES`] times overall.
fn lock_exclusive(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::invalid_response(format!("creating {parent:?}: {e}")))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::invalid_response(format!("opening {path:?} for locking: {e}")))?;

    let per_attempt = LOCK_TIMEOUT / LOCK_RETRIES;
    for attempt in 1..=LOCK_RETRIES {
        let cloned = file
            .try_clone()
            .map_err(|e| Error::invalid_response(format!("cloning lock handle: {e}")))?;
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let result = FileExt::lock_exclusive(&cloned);
            let _ = tx.send(result);
        });
        match rx.recv_timeout(per_attempt) {
            Ok(Ok(())) => return Ok(file),
            Ok(Err(e)) if attempt == LOCK_RETRIES => {
                return Err(Error::transient(format!("locking {path:?}: {e}")))
            }
            Err(_) if attempt == LOCK_RETRIES => {
                return Err(Error::transient(format!(
                    "timed out acquiring lock on {path:?} after {LOCK_RETRIES} attempts"
                )))
            }
            _ => {
                reelscout_core::log_event::warn(
                    Some("master_merge"),
                    &format!("lock busy on {path:?}, attempt {attempt}/{LOCK_RETRIES}"),
                );
            }
        }
    }
    unreachable!("loop always returns on its final iteration")
}

/// Merge `session_rows` into `master_path`, under an exclusive file lock.
/// Synchronous and blocking; callers on an async executor should run this
/// through `spawn_blocking`.
pub fn merge_into_master(master_path: &Path, session_rows: &[Reel]) -> Result<usize> {
    let lock_path = master_path.with_extension("csv.lock");
    let _lock = lock_exclusive(&lock_path)?;

    let (existing_header, existing_rows) = read_rows(master_path)?;
    let now = Utc::now();

    let mut by_url: HashMap<String, Reel> = HashMap::with_capacity(existing_rows.len());
    for row in &existing_rows {
        let reel = row_to_reel(row, now);
        by_url.insert(reel.url.clone(), reel);
    }

    for incoming in session_rows {
        match by_url.get(&incoming.url) {
            Some(existing) => {
                let merged = merge_rows(existing, incoming);
                by_url.insert(incoming.url.clone(), merged);
            }
            None => {
                by_url.insert(incoming.url.clone(), incoming.clone());
            }
        }
    }

    let mut merged: Vec<Reel> = by_url.into_values().collect();
    merged.sort_by(|a, b| {
        a.row_created_at
            .cmp(&b.row_created_at)
            .then_with(|| a.url.cmp(&b.url))
    });

    let header = widen_header(&existing_header);
    let rows: Vec<Row> = merged.iter().map(reel_to_row).collect();
    write_rows(master_path, &header, &rows)?;

    FileExt::unlock(&_lock).ok();
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn reel_at(url: &str, views: u64, status: reelscout_core::model::Status, when: chrono::DateTime<Utc>) -> Reel {
        let mut reel = Reel::discovered(url, "kw", when);
        reel.views = Some(views);
        reel.status = status;
        reel.row_updated_at = when;
        reel
    }

    #[test]
    fn merge_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let master_path = dir.path().join("master.csv");
        let now = Utc::now();
        let rows = vec![reel_at(
            "https://www.instagram.com/reel/Cabc",
            100,
            reelscout_core::model::Status::Accepted,
            now,
        )];

        merge_into_master(&master_path, &rows).unwrap();
        let first = std::fs::read_to_string(&master_path).unwrap();
        merge_into_master(&master_path, &rows).unwrap();
        let second = std::fs::read_to_string(&master_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn later_discovery_updates_views_without_downgrading_status() {
        let dir = tempfile::tempdir().unwrap();
        let master_path = dir.path().join("master.csv");
        let t1 = Utc::now();
        let t2 = t1 + ChronoDuration::seconds(10);

        let session_a = vec![reel_at(
            "https://www.instagram.com/reel/Cabc",
            1000,
            reelscout_core::model::Status::Accepted,
            t1,
        )];
        merge_into_master(&master_path, &session_a).unwrap();

        let session_b = vec![reel_at(
            "https://www.instagram.com/reel/Cabc",
            1500,
            reelscout_core::model::Status::Discovered,
            t2,
        )];
        merge_into_master(&master_path, &session_b).unwrap();

        let (_, rows) = read_rows(&master_path).unwrap();
        let reel = row_to_reel(&rows[0], Utc::now());
        assert_eq!(reel.views, Some(1500));
        assert_eq!(reel.status, reelscout_core::model::Status::Accepted);
    }

    #[test]
    fn rows_ordered_by_first_discovery_time() {
        let dir = tempfile::tempdir().unwrap();
        let master_path = dir.path().join("master.csv");
        let t1 = Utc::now();
        let t2 = t1 + ChronoDuration::seconds(10);

        let rows = vec![
            reel_at("https://www.instagram.com/reel/Second", 1, reelscout_core::model::Status::Discovered, t2),
            reel_at("https://www.instagram.com/reel/First", 1, reelscout_core::model::Status::Discovered, t1),
        ];
        merge_into_master(&master_path, &rows).unwrap();

        let (_, read) = read_rows(&master_path).unwrap();
        assert_eq!(read[0].get("url").unwrap(), "https://www.instagram.com/reel/First");
        assert_eq!(read[1].get("url").unwrap(), "https://www.instagram.com/reel/Second");
    }
}
