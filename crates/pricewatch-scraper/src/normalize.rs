//! Raw price text → two-decimal VAT-exclusive / VAT-inclusive pair.
//!
//! Parsing is blunt: everything that is not an ASCII digit or
//! `.` is discarded, so `"£1,234.56 inc VAT"` reads as `1234.56`. Comma
//! decimal separators are therefore not supported; a comma is always treated
//! as a thousands separator and dropped.
//!
//! Arithmetic happens in `f64`. Rounding to cents goes through
//! [`rust_decimal`] with [`RoundingStrategy::MidpointAwayFromZero`], so an
//! exact tie such as `0.125` becomes `0.13`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ScraperError;

/// UK standard rate, used when no rate is configured.
pub const DEFAULT_VAT_RATE: f64 = 0.2;

/// A price with and without VAT, both rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePair {
    pub excl_vat: Decimal,
    pub incl_vat: Decimal,
}

/// Drops every character that is not an ASCII digit or `.`, then a single
/// trailing `.` if one is left over.
#[must_use]
pub fn clean_price_text(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.ends_with('.') {
        cleaned.pop();
    }
    cleaned
}

/// Cleans `raw` with [`clean_price_text`] and parses what remains.
///
/// # Errors
///
/// Returns [`ScraperError::PriceParse`] when nothing numeric is left, the
/// remainder is not a number (e.g. `"1.2.3"`), or it overflows `f64`.
pub fn parse_price(raw: &str) -> Result<f64, ScraperError> {
    let cleaned = clean_price_text(raw);
    if cleaned.is_empty() {
        return Err(ScraperError::PriceParse {
            raw: raw.to_owned(),
            reason: "no digits found".into(),
        });
    }

    let value = cleaned
        .parse::<f64>()
        .map_err(|e| ScraperError::PriceParse {
            raw: raw.to_owned(),
            reason: format!("\"{cleaned}\" is not a number: {e}"),
        })?;

    if !value.is_finite() {
        return Err(ScraperError::PriceParse {
            raw: raw.to_owned(),
            reason: format!("\"{cleaned}\" is out of range"),
        });
    }

    Ok(value)
}

/// Derives both VAT variants from an already-parsed price.
///
/// `vat_included` says which side `parsed` is on. The multiplier is
/// `1 + vat_rate`.
///
/// # Errors
///
/// Returns [`ScraperError::PriceParse`] if either value cannot be
/// represented as a [`Decimal`].
pub fn vat_pair(parsed: f64, vat_included: bool, vat_rate: f64) -> Result<PricePair, ScraperError> {
    let multiplier = 1.0 + vat_rate;
    let (excl, incl) = if vat_included {
        (parsed / multiplier, parsed)
    } else {
        (parsed, parsed * multiplier)
    };

    Ok(PricePair {
        excl_vat: round_to_cents(excl)?,
        incl_vat: round_to_cents(incl)?,
    })
}

/// Full normalization of one raw extraction.
///
/// # Errors
///
/// Returns [`ScraperError::PriceParse`] if `raw` does not yield a usable number.
pub fn normalize_price(
    raw: &str,
    vat_included: bool,
    vat_rate: f64,
) -> Result<PricePair, ScraperError> {
    let parsed = parse_price(raw)?;
    vat_pair(parsed, vat_included, vat_rate).map_err(|e| match e {
        ScraperError::PriceParse { reason, .. } => ScraperError::PriceParse {
            raw: raw.to_owned(),
            reason,
        },
        other => other,
    })
}

/// Rounds to two decimal places, half away from zero, with the scale fixed
/// at 2 so the value always renders as `x.yy`.
fn round_to_cents(value: f64) -> Result<Decimal, ScraperError> {
    let decimal = Decimal::from_f64(value).ok_or_else(|| ScraperError::PriceParse {
        raw: value.to_string(),
        reason: "value does not fit a decimal price".into(),
    })?;
    let mut rounded = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Ok(rounded)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
