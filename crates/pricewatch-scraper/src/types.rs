use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ScraperError;

/// One normalized price observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceResult {
    /// Endpoint display name.
    pub name: String,
    /// Name of the target group the endpoint belongs to.
    pub group: String,
    pub method: String,
    pub url: String,
    pub price_excl_vat: Decimal,
    pub price_incl_vat: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl PriceResult {
    /// `name,excl,incl,group` with both prices at two decimals. The group
    /// column tells apart products tracked at the same shop.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{:.2},{:.2},{}",
            self.name, self.price_excl_vat, self.price_incl_vat, self.group
        )
    }
}

/// An error attributed to the endpoint that produced it.
#[derive(Debug)]
pub struct EndpointFailure {
    pub group: String,
    pub name: String,
    pub url: String,
    pub error: ScraperError,
}

impl std::fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} ({}): {}", self.group, self.name, self.url, self.error)
    }
}

impl EndpointFailure {
    /// Wraps the failure as the error that ends a fail-fast run.
    #[must_use]
    pub fn into_abort(self) -> ScraperError {
        ScraperError::Aborted {
            url: self.url,
            source: Box::new(self.error),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<PriceResult>,
    pub failures: Vec<EndpointFailure>,
    /// Endpoints the run was asked to scrape.
    pub endpoints: usize,
    /// Endpoints that reported at least one failure.
    pub failed_endpoints: usize,
}

impl RunReport {
    /// `true` when there was work to do and every endpoint failed.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.endpoints > 0 && self.failed_endpoints == self.endpoints && self.results.is_empty()
    }
}
