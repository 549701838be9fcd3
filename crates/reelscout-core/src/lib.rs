//! Shared types for the reel discovery agent: the [`model::Reel`] data
//! model, the crate-wide [`error::Error`], the driver-owned
//! [`conversation::ConversationItem`] list, the [`tools::Tool`] contract,
//! and structured [`log_event`] helpers.

pub mod conversation;
pub mod error;
pub mod log_event;
pub mod model;
pub mod tools;

pub use error::{Error, ErrorKind, Result};
