//! Fans target groups out into concurrent endpoint tasks and gathers what
//! they produce.
//!
//! Every endpoint is spawned onto the runtime immediately; a semaphore
//! bounds how many fetch at once. Under [`FailurePolicy::Isolate`] each
//! endpoint's failures are recorded and the run continues. Under
//! [`FailurePolicy::FailFast`] the first failure aborts all outstanding
//! tasks and the run returns [`ScraperError::Aborted`] with no results.

use std::sync::Arc;

use pricewatch_core::{AppConfig, FailurePolicy, TargetGroup};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::aggregate::ResultAggregator;
use crate::client::PageClient;
use crate::error::ScraperError;
use crate::normalize::DEFAULT_VAT_RATE;
use crate::registry::SelectorRegistry;
use crate::task::{scrape_endpoint, EndpointTask};
use crate::types::{EndpointFailure, RunReport};

/// Tuning for a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// Upper bound on simultaneous in-flight fetches. Values below 1 are treated as 1.
    pub max_concurrent_fetches: usize,
    pub vat_rate: f64,
    pub failure_policy: FailurePolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            vat_rate: DEFAULT_VAT_RATE,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

impl RunSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches,
            vat_rate: config.vat_rate,
            failure_policy: config.failure_policy,
        }
    }
}

/// Endpoint tasks ready to launch, plus endpoints whose group could not be
/// resolved to a usable rule.
#[derive(Debug, Default)]
pub struct RunPlan {
    pub tasks: Vec<EndpointTask>,
    pub failures: Vec<EndpointFailure>,
}

pub struct Orchestrator {
    client: Arc<PageClient>,
    registry: Arc<SelectorRegistry>,
    settings: RunSettings,
}

impl Orchestrator {
    #[must_use]
    pub fn new(client: PageClient, registry: SelectorRegistry, settings: RunSettings) -> Self {
        Self {
            client: Arc::new(client),
            registry: Arc::new(registry),
            settings,
        }
    }

    /// Expands groups into one task per endpoint.
    ///
    /// A group whose method is unknown or whose selector does not parse
    /// contributes one failure per endpoint instead of tasks.
    #[must_use]
    pub fn plan(&self, groups: &[TargetGroup]) -> RunPlan {
        let mut plan = RunPlan::default();

        for group in groups {
            for endpoint in &group.endpoints {
                let rule = self
                    .registry
                    .rule_for_group(group)
                    .and_then(|rule| rule.compile().map(|_| rule));

                match rule {
                    Ok(rule) => plan.tasks.push(EndpointTask {
                        group: group.name.clone(),
                        method: group.method.clone(),
                        rule,
                        vat_included: group.vat_included,
                        url: endpoint.url.clone(),
                        name: endpoint.name.clone(),
                    }),
                    Err(error) => plan.failures.push(EndpointFailure {
                        group: group.name.clone(),
                        name: endpoint.name.clone(),
                        url: endpoint.url.clone(),
                        error,
                    }),
                }
            }
        }

        plan
    }

    /// Scrapes every endpoint of every group and returns what was collected.
    ///
    /// # Errors
    ///
    /// Only under [`FailurePolicy::FailFast`]: returns
    /// [`ScraperError::Aborted`] wrapping the first failure. Outstanding
    /// tasks are cancelled and collected results discarded.
    pub async fn run(&self, groups: &[TargetGroup]) -> Result<RunReport, ScraperError> {
        let total_endpoints: usize = groups.iter().map(|g| g.endpoints.len()).sum();
        if total_endpoints == 0 {
            tracing::info!("no endpoints configured; nothing to scrape");
            return Ok(RunReport::default());
        }

        let RunPlan {
            tasks,
            mut failures,
        } = self.plan(groups);
        let fail_fast = self.settings.failure_policy == FailurePolicy::FailFast;

        if fail_fast && !failures.is_empty() {
            let first = failures.swap_remove(0);
            tracing::error!(failure = %first, "unresolvable target; aborting run");
            return Err(first.into_abort());
        }

        let mut failed_endpoints = failures.len();
        let max_concurrent = self.settings.max_concurrent_fetches.max(1);
        tracing::info!(
            endpoints = total_endpoints,
            launching = tasks.len(),
            max_concurrent,
            policy = %self.settings.failure_policy,
            "starting scrape run"
        );

        let aggregator = Arc::new(ResultAggregator::new());
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut set: JoinSet<Vec<EndpointFailure>> = JoinSet::new();

        for task in tasks {
            let client = Arc::clone(&self.client);
            let aggregator = Arc::clone(&aggregator);
            let semaphore = Arc::clone(&semaphore);
            let vat_rate = self.settings.vat_rate;

            set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return vec![task.failure(ScraperError::TaskJoin(
                        "fetch semaphore closed".to_owned(),
                    ))];
                };
                let outcome = scrape_endpoint(&client, &task, vat_rate).await;
                aggregator.append_all(outcome.results);
                outcome.failures
            });
        }

        while let Some(joined) = set.join_next().await {
            let mut endpoint_failures = match joined {
                Ok(endpoint_failures) => endpoint_failures,
                Err(e) => vec![EndpointFailure {
                    group: "unknown".to_owned(),
                    name: "unknown".to_owned(),
                    url: "unknown".to_owned(),
                    error: ScraperError::TaskJoin(e.to_string()),
                }],
            };

            if endpoint_failures.is_empty() {
                continue;
            }

            if fail_fast {
                set.shutdown().await;
                let first = endpoint_failures.swap_remove(0);
                tracing::error!(failure = %first, "endpoint failed; aborting run");
                return Err(first.into_abort());
            }

            failed_endpoints += 1;
            failures.append(&mut endpoint_failures);
        }

        let results = aggregator.drain();
        if failed_endpoints > 0 {
            tracing::warn!(
                failed_endpoints,
                total_endpoints,
                "some endpoints failed during the run"
            );
        }
        tracing::info!(prices = results.len(), "scrape run finished");

        Ok(RunReport {
            results,
            failures,
            endpoints: total_endpoints,
            failed_endpoints,
        })
    }
}
