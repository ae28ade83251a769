//! `pricewatch scrape`: load targets, run the pipeline, report.

use std::path::PathBuf;

use pricewatch_core::AppConfig;
use pricewatch_scraper::{Orchestrator, PageClient, RunSettings, SelectorRegistry};

use crate::report::{write_failure_summary, write_results};
use crate::ScrapeArgs;

/// Settings for this invocation: config values with CLI flags laid over them.
pub(crate) fn run_settings(config: &AppConfig, args: &ScrapeArgs) -> RunSettings {
    let mut settings = RunSettings::from_app_config(config);
    if let Some(policy) = args.policy {
        settings.failure_policy = policy;
    }
    if let Some(max_concurrent) = args.max_concurrent {
        settings.max_concurrent_fetches = max_concurrent;
    }
    if let Some(vat_rate) = args.vat_rate {
        settings.vat_rate = vat_rate;
    }
    settings
}

pub(crate) fn targets_path(config: &AppConfig, flag: Option<&std::path::Path>) -> PathBuf {
    flag.map_or_else(|| config.targets_path.clone(), std::path::Path::to_path_buf)
}

/// Scrapes every configured endpoint and writes one line per price to stdout.
///
/// Under `isolate`, endpoint failures are summarised on stderr and the run
/// succeeds unless every endpoint failed.
///
/// # Errors
///
/// Returns an error if the targets file is malformed, the HTTP client cannot
/// be built, a `fail-fast` run aborts, or no endpoint produced a result.
pub(crate) async fn run_scrape(config: &AppConfig, args: &ScrapeArgs) -> anyhow::Result<()> {
    let path = targets_path(config, args.targets.as_deref());
    let targets = pricewatch_core::load_targets(&path)?;

    let registry = SelectorRegistry::from_targets(&targets);
    if let Err(e) = registry.validate() {
        // Only groups that use the broken rule fail; they are reported per endpoint.
        tracing::warn!(error = %e, "targets file registers an invalid selector");
    }

    let settings = run_settings(config, args);
    let client = PageClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    tracing::info!(
        path = %path.display(),
        groups = targets.targets.len(),
        endpoints = targets.endpoint_count(),
        policy = %settings.failure_policy,
        "loaded targets"
    );

    let orchestrator = Orchestrator::new(client, registry, settings);
    let report = orchestrator
        .run(&targets.targets)
        .await
        .map_err(|e| anyhow::anyhow!("scrape aborted: {e}"))?;

    write_results(&mut std::io::stdout().lock(), &report.results, args.format)?;
    write_failure_summary(&mut std::io::stderr().lock(), &report)?;

    if report.is_total_failure() {
        anyhow::bail!("all {} endpoints failed", report.endpoints);
    }
    Ok(())
}
