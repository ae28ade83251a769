//! Applies an [`ExtractionRule`] to a fetched document.

use scraper::Html;

use crate::error::ScraperError;
use crate::registry::ExtractionRule;

/// Returns the text content of every node matched by `rule`, in document
/// order. Text of nested nodes is concatenated, untrimmed.
///
/// # Errors
///
/// - [`ScraperError::InvalidSelector`] if the rule does not parse.
/// - [`ScraperError::ExtractionEmpty`] if nothing in the document matches.
pub fn extract_raw_prices(
    html: &str,
    rule: &ExtractionRule,
    url: &str,
) -> Result<Vec<String>, ScraperError> {
    let selector = rule.compile()?;
    let document = Html::parse_document(html);

    let matches: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    if matches.is_empty() {
        return Err(ScraperError::ExtractionEmpty {
            url: url.to_owned(),
            selector: rule.as_str().to_owned(),
            reason: "selector matched no nodes".into(),
        });
    }

    Ok(matches)
}
