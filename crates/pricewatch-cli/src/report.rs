//! Rendering of run results. Prices go to stdout; the failure summary goes
//! to stderr so piping the output never mixes the two.

use std::io::{self, Write};

use pricewatch_scraper::{PriceResult, RunReport};

use crate::OutputFormat;

/// Writes one line per result in the requested format: CSV
/// `name,price_excl_vat,price_incl_vat,group` or one JSON object per line.
pub(crate) fn write_results<W: Write>(
    out: &mut W,
    results: &[PriceResult],
    format: OutputFormat,
) -> anyhow::Result<()> {
    for result in results {
        match format {
            OutputFormat::Csv => writeln!(out, "{}", result.to_csv_line())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, result)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Lists every failure of a run, one per line, after a count header.
pub(crate) fn write_failure_summary<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    if report.failures.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "{} of {} endpoints failed:",
        report.failed_endpoints, report.endpoints
    )?;
    for failure in &report.failures {
        writeln!(out, "  {failure}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pricewatch_scraper::{EndpointFailure, ScraperError};
    use rust_decimal::Decimal;

    use super::*;

    fn result() -> PriceResult {
        PriceResult {
            name: "NetXL".to_owned(),
            group: "UAP-AC-LR".to_owned(),
            method: "netxl".to_owned(),
            url: "https://www.netxl.com/uap-ac-lr".to_owned(),
            price_excl_vat: Decimal::new(8999, 2),
            price_incl_vat: Decimal::new(10799, 2),
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn csv_lines_match_result_format() {
        let mut out = Vec::new();
        write_results(&mut out, &[result(), result()], OutputFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NetXL,89.99,107.99,UAP-AC-LR\nNetXL,89.99,107.99,UAP-AC-LR\n"
        );
    }

    #[test]
    fn json_lines_carry_method_group_and_prices() {
        let mut out = Vec::new();
        write_results(&mut out, &[result()], OutputFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["group"], "UAP-AC-LR");
        assert_eq!(value["method"], "netxl");
        assert_eq!(value["price_excl_vat"], "89.99");
        assert_eq!(value["price_incl_vat"], "107.99");
    }

    #[test]
    fn empty_results_write_nothing() {
        let mut out = Vec::new();
        write_results(&mut out, &[], OutputFormat::Csv).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn failure_summary_lists_each_failure() {
        let report = RunReport {
            results: vec![result()],
            failures: vec![EndpointFailure {
                group: "UAP-AC-LR".to_owned(),
                name: "Voipon".to_owned(),
                url: "https://voipon.test/x".to_owned(),
                error: ScraperError::NotFound {
                    url: "https://voipon.test/x".to_owned(),
                },
            }],
            endpoints: 2,
            failed_endpoints: 1,
        };
        let mut out = Vec::new();
        write_failure_summary(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1 of 2 endpoints failed:\n"));
        assert!(text.contains("UAP-AC-LR / Voipon (https://voipon.test/x)"));
    }

    #[test]
    fn clean_run_has_no_summary() {
        let mut out = Vec::new();
        write_failure_summary(&mut out, &RunReport::default()).unwrap();
        assert!(out.is_empty());
    }
}
