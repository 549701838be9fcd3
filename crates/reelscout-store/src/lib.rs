//! The tabular store (spec §4.4): a per-session CSV row log, a file-locked
//! cross-session master merger, and a session analyzer. Schema is
//! append/widen-only throughout; see [`columns`] for the row shape readers
//! must tolerate.

pub mod analyzer;
pub mod columns;
pub mod csvfile;
pub mod master;
pub mod session;

pub use analyzer::{analyze, SessionStats, UsCounts};
pub use master::merge_into_master;
pub use session::{SessionLog, SessionMetadata};
