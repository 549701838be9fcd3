//! HTTP adapters for the four external services the agent consumes: web
//! search, Instagram post metadata, Instagram transcripts, and Instagram
//! profiles (spec §4.3). Each adapter is a thin client with its own bounded
//! concurrency pool; shared plumbing lives in [`http`].

pub mod http;
pub mod post;
pub mod profile;
pub mod search;
pub mod transcript;

pub use post::{PostAdapter, PostBrief};
pub use profile::ProfileAdapter;
pub use search::{normalize_reel_url, SearchAdapter, SearchConfig};
pub use transcript::{TranscriptAdapter, TranscriptResult};
