//! Build minimal [`Reel`] patches to hand to [`reelscout_store::SessionLog::upsert`].
//! Relies on [`Reel::merge_from`]'s append-or-patch semantics: a field left
//! at its `Reel::discovered` default (`None`/`Unknown`/empty string) is read
//! by the merge as "no update", never as an erasure.

use chrono::{DateTime, Utc};
use reelscout_core::model::{Reel, Status};

/// A patch that only advances `status`, with no other field changes.
#[must_use]
pub fn status_patch(url: &str, keyword: &str, status: Status, now: DateTime<Utc>) -> Reel {
    let mut patch = Reel::discovered(url, keyword, now);
    patch.status = status;
    patch
}
