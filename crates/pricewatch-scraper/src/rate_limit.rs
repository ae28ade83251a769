//! Retry utilities for page fetches.
//!
//! Transient failures (429, 5xx, network errors) are retried with
//! exponential backoff. Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: connection reset, timeout, TLS failure.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// 404s, 4xx statuses, bad URLs and anything past the fetch stage are
/// returned immediately.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        _ => false,
    }
}

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Seconds to wait before retrying after `err` on the given attempt.
///
/// Exponential backoff, raised to the server's `Retry-After` (capped at
/// [`MAX_RETRY_AFTER_SECS`]) when the error is a 429.
fn retry_delay_secs(err: &ScraperError, attempt: u32, backoff_base_secs: u64) -> u64 {
    // Cap the shift so extreme configs saturate instead of overflowing.
    let backoff = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => backoff.max((*retry_after_secs).min(MAX_RETRY_AFTER_SECS)),
        _ => backoff,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds, or longer if a 429 asked for more, and tries again, up to `max_retries` additional attempts. When
/// retries are exhausted the last error is returned.
///
/// | Attempt | Sleep before next attempt (`backoff_base_secs = 1`) |
/// |---------|------------------------------------------------------|
/// | 0 (initial) | none |
/// | 1 | 1 s |
/// | 2 | 2 s |
/// | 3 | 4 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let last_err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        let delay_secs = retry_delay_secs(&last_err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
