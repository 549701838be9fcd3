//! Error kinds shared across the agent.
//!
//! Behavioral categories, not type names (see spec §7): each kind carries its
//! own retry/propagation policy, decided by the caller rather than baked into
//! this type. `Error` itself is just `{kind, message}`.

use std::fmt;

/// Behavioral error category. Drives retry policy and CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Missing credentials or invalid enum value. No retry, exit 71.
    Config,
    /// HTTP 5xx, timeout, JSON decode error. Retried with backoff.
    Transient,
    /// HTTP 429. Retried with a minimum 2s delay.
    RateLimited,
    /// HTTP 402. Never retried.
    OutOfCredits,
    /// HTTP 401/403. Never retried, exit 71.
    AuthFailed,
    /// Required field missing or malformed in a provider response.
    InvalidResponse,
    /// Requested resource was not found upstream.
    NotFound,
    /// Non-2xx from the LLM endpoint. Retried once.
    LlmError,
    /// A tool call failed validation or dispatch inside the router.
    ToolError,
}

impl ErrorKind {
    /// Whether this kind is ever worth retrying.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimited)
    }

    /// Process exit code this kind maps to when it escapes the CLI boundary.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Config => 71,
            Self::AuthFailed => 71,
            Self::OutOfCredits => 70,
            Self::LlmError => 70,
            _ => 70,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Config => "config_error",
            Self::Transient => "transient",
            Self::RateLimited => "rate_limited",
            Self::OutOfCredits => "out_of_credits",
            Self::AuthFailed => "auth_failed",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::LlmError => "llm_error",
            Self::ToolError => "tool_error",
        };
        f.write_str(s)
    }
}

/// The crate-wide error type. Carries a classified [`ErrorKind`] plus a
/// human-readable message; never a raw `String`, so callers can branch on
/// `.kind()` without parsing text.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// Construct an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::Config`].
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Shorthand for [`ErrorKind::Transient`].
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    /// Shorthand for [`ErrorKind::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Shorthand for [`ErrorKind::OutOfCredits`].
    pub fn out_of_credits(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfCredits, message)
    }

    /// Shorthand for [`ErrorKind::AuthFailed`].
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailed, message)
    }

    /// Shorthand for [`ErrorKind::InvalidResponse`].
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    /// Shorthand for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for [`ErrorKind::LlmError`].
    pub fn llm_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LlmError, message)
    }

    /// Shorthand for [`ErrorKind::ToolError`].
    pub fn tool_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolError, message)
    }

    /// The behavioral category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
