//! Fetch → extract → normalize for a single endpoint.

use chrono::{DateTime, Utc};

use crate::client::PageClient;
use crate::error::ScraperError;
use crate::extract::extract_raw_prices;
use crate::normalize::normalize_price;
use crate::registry::ExtractionRule;
use crate::types::{EndpointFailure, PriceResult};

/// One endpoint with everything it needs from its group captured by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTask {
    pub group: String,
    pub method: String,
    pub rule: ExtractionRule,
    pub vat_included: bool,
    pub url: String,
    pub name: String,
}

impl EndpointTask {
    pub(crate) fn failure(&self, error: ScraperError) -> EndpointFailure {
        EndpointFailure {
            group: self.group.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            error,
        }
    }
}

/// What one endpoint produced. A fetch failure yields no results; a bad
/// match only costs that match.
#[derive(Debug, Default)]
pub(crate) struct EndpointOutcome {
    pub results: Vec<PriceResult>,
    pub failures: Vec<EndpointFailure>,
}

pub(crate) async fn scrape_endpoint(
    client: &PageClient,
    task: &EndpointTask,
    vat_rate: f64,
) -> EndpointOutcome {
    let html = match client.fetch_document(&task.url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url = %task.url, name = %task.name, error = %e, "fetch failed");
            return EndpointOutcome {
                results: Vec::new(),
                failures: vec![task.failure(e)],
            };
        }
    };
    let fetched_at = Utc::now();

    // Keep the parsed document out of any await: `scraper::Html` is not `Send`.
    price_document(task, &html, vat_rate, fetched_at)
}

/// Extracts and normalizes every match in an already fetched document.
pub(crate) fn price_document(
    task: &EndpointTask,
    html: &str,
    vat_rate: f64,
    fetched_at: DateTime<Utc>,
) -> EndpointOutcome {
    let mut outcome = EndpointOutcome::default();

    let matches = match extract_raw_prices(html, &task.rule, &task.url) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(url = %task.url, selector = %task.rule, error = %e, "extraction failed");
            outcome.failures.push(task.failure(e));
            return outcome;
        }
    };

    for (index, raw) in matches.iter().enumerate() {
        if raw.trim().is_empty() {
            outcome.failures.push(task.failure(ScraperError::ExtractionEmpty {
                url: task.url.clone(),
                selector: task.rule.as_str().to_owned(),
                reason: format!("match {index} has no text"),
            }));
            continue;
        }

        match normalize_price(raw, task.vat_included, vat_rate) {
            Ok(price) => outcome.results.push(PriceResult {
                name: task.name.clone(),
                group: task.group.clone(),
                method: task.method.clone(),
                url: task.url.clone(),
                price_excl_vat: price.excl_vat,
                price_incl_vat: price.incl_vat,
                fetched_at,
            }),
            Err(e) => {
                tracing::warn!(url = %task.url, raw = raw.trim(), error = %e, "unparsable price");
                outcome.failures.push(task.failure(e));
            }
        }
    }

    tracing::debug!(
        url = %task.url,
        prices = outcome.results.len(),
        failures = outcome.failures.len(),
        "endpoint scraped"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(selector: &str, vat_included: bool) -> EndpointTask {
        EndpointTask {
            group: "UAP-AC-PRO".to_owned(),
            method: "4gon".to_owned(),
            rule: ExtractionRule::new(selector),
            vat_included,
            url: "https://www.4gon.co.uk/uap-ac-pro".to_owned(),
            name: "4Gon".to_owned(),
        }
    }

    #[test]
    fn single_match_becomes_one_result() {
        let html = r#"<div id="price_gross"><strong>£120.00 inc VAT</strong></div>"#;
        let outcome = price_document(&task("#price_gross strong", true), html, 0.2, Utc::now());
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.results.len(), 1);
        let r = &outcome.results[0];
        assert_eq!(r.name, "4Gon");
        assert_eq!(r.group, "UAP-AC-PRO");
        assert_eq!(r.method, "4gon");
        assert_eq!(r.to_csv_line(), "4Gon,100.00,120.00,UAP-AC-PRO");
    }

    #[test]
    fn bad_matches_fail_individually() {
        let html = r#"
            <p class="p">£10.00</p>
            <p class="p">POA</p>
            <p class="p"> </p>
            <p class="p">£12.00</p>
        "#;
        let outcome = price_document(&task("p.p", false), html, 0.2, Utc::now());
        let csv: Vec<String> = outcome.results.iter().map(PriceResult::to_csv_line).collect();
        assert_eq!(csv, ["4Gon,10.00,12.00,UAP-AC-PRO", "4Gon,12.00,14.40,UAP-AC-PRO"]);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(
            outcome.failures[0].error,
            ScraperError::PriceParse { .. }
        ));
        assert!(matches!(
            outcome.failures[1].error,
            ScraperError::ExtractionEmpty { .. }
        ));
    }

    #[test]
    fn no_match_is_one_failure() {
        let outcome = price_document(&task("#missing", false), "<p>£1</p>", 0.2, Utc::now());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].url, "https://www.4gon.co.uk/uap-ac-pro");
    }
}
