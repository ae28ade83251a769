//! HTTP client for fetching product pages.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

// Re-export for test visibility via `use super::*`
#[cfg(test)]
use origin::extract_domain;

/// Fetches product pages as HTML text.
///
/// Every request is bounded by the configured timeout. 429, 5xx and
/// network failures are retried with exponential backoff up to
/// `max_retries` additional attempts; other non-2xx statuses are returned as
/// typed errors straight away.
pub struct PageClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl PageClient {
    /// Creates a `PageClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first failure for
    /// retriable errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute http(s) URL (not retried).
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::Http`]: network, timeout or TLS failure after all retries exhausted.
    pub async fn fetch_document(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = Self::page_url(url)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-GB,en;q=0.9")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScraperError::RateLimited {
                        domain: origin::extract_domain(parsed.as_str()),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: parsed.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: parsed.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Parses and checks a page URL before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for unparsable URLs and for
    /// schemes other than `http` / `https`.
    fn page_url(url: &str) -> Result<reqwest::Url, ScraperError> {
        let parsed = reqwest::Url::parse(url.trim()).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(ScraperError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{other}\""),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
