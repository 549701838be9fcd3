//! Shared HTTP plumbing for the three provider adapters (spec §4.3).
//!
//! Each adapter wraps a [`ProviderClient`]: a timeout-configured
//! `reqwest::Client`, a bounded concurrency [`tokio::sync::Semaphore`] (so a
//! chatty turn in one adapter cannot starve another, per spec §5), and
//! status-code classification into the shared [`ErrorKind`] taxonomy.

use reelscout_core::error::{Error, ErrorKind, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Classify an HTTP status code into the behavioral error taxonomy (spec
/// §4.3/§7). Returns `None` for a successful status.
#[must_use]
pub fn classify_status(status: StatusCode) -> Option<ErrorKind> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        StatusCode::PAYMENT_REQUIRED => ErrorKind::OutOfCredits,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::AuthFailed,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        s if s.is_server_error() => ErrorKind::Transient,
        _ => ErrorKind::InvalidResponse,
    })
}

/// A timeout- and concurrency-bounded HTTP client shared by one provider's
/// batch calls.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ProviderClient {
    /// Build a client with the given per-request timeout and max concurrent
    /// in-flight requests.
    pub fn new(timeout: Duration, max_concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::transient(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    /// The underlying `reqwest::Client`.
    #[must_use]
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Acquire a concurrency permit, awaiting if the pool is saturated.
    pub async fn acquire(&self) -> tokio::sync::SemaphorePermit<'_> {
        self.semaphore
            .acquire()
            .await
            .expect("semaphore is never closed")
    }
}

/// Sleep for the retry backoff appropriate to `kind`, returning `false` if
/// `kind` should never be retried.
///
/// Transient errors back off exponentially from 500ms; rate limiting waits
/// at least 2s (spec §4.7/§7). `out_of_credits` and `auth_failed` are never
/// retried.
pub async fn backoff_delay(kind: ErrorKind, attempt: u32) {
    let delay = match kind {
        ErrorKind::RateLimited => Duration::from_millis(2_000 * u64::from(attempt.max(1))),
        ErrorKind::Transient | ErrorKind::LlmError => {
            Duration::from_millis(500 * 2u64.pow(attempt.saturating_sub(1)))
        }
        _ => return,
    };
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_statuses() {
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Some(ErrorKind::RateLimited)
        );
        assert_eq!(
            classify_status(StatusCode::PAYMENT_REQUIRED),
            Some(ErrorKind::OutOfCredits)
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(ErrorKind::AuthFailed)
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Some(ErrorKind::Transient)
        );
        assert_eq!(classify_status(StatusCode::OK), None);
    }
}
