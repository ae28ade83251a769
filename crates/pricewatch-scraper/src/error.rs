use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no extraction rule registered for method \"{method}\" and it is not a valid selector")]
    UnknownMethod { method: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("nothing to extract from {url} with \"{selector}\": {reason}")]
    ExtractionEmpty {
        url: String,
        selector: String,
        reason: String,
    },

    #[error("cannot parse price from \"{raw}\": {reason}")]
    PriceParse { raw: String, reason: String },

    #[error("run aborted by failure at {url}: {source}")]
    Aborted {
        url: String,
        #[source]
        source: Box<ScraperError>,
    },

    #[error("endpoint task did not complete: {0}")]
    TaskJoin(String),
}

impl ScraperError {
    /// `true` for network, transport, and HTTP status failures.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::RateLimited { .. }
                | ScraperError::NotFound { .. }
                | ScraperError::UnexpectedStatus { .. }
                | ScraperError::InvalidUrl { .. }
        )
    }
}
