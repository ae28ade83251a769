use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What a run does when a single endpoint fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure against its endpoint and keep going.
    #[default]
    Isolate,
    /// Cancel every outstanding fetch and discard all results.
    FailFast,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Isolate => write!(f, "isolate"),
            FailurePolicy::FailFast => write!(f, "fail-fast"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isolate" => Ok(FailurePolicy::Isolate),
            "fail-fast" | "fail_fast" => Ok(FailurePolicy::FailFast),
            other => Err(format!(
                "unknown failure policy \"{other}\"; expected isolate or fail-fast"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub targets_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_fetches: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Fractional VAT rate, e.g. `0.2` for 20%.
    pub vat_rate: f64,
    pub failure_policy: FailurePolicy,
}
