use crate::app_config::{AppConfig, Environment, FailurePolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default("PRICEWATCH_TARGETS_PATH", "./targets.json"));

    let request_timeout_secs = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRICEWATCH_USER_AGENT", "pricewatch/0.1 (price-monitor)");
    let max_concurrent_fetches = parse_usize("PRICEWATCH_MAX_CONCURRENT_FETCHES", "8")?;
    if max_concurrent_fetches == 0 {
        return Err(invalid(
            "PRICEWATCH_MAX_CONCURRENT_FETCHES",
            "must be at least 1".to_string(),
        ));
    }
    let max_retries = parse_u32("PRICEWATCH_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("PRICEWATCH_RETRY_BACKOFF_BASE_SECS", "1")?;

    let vat_rate = parse_vat_rate(&or_default("PRICEWATCH_VAT_RATE", "0.20"))
        .map_err(|reason| invalid("PRICEWATCH_VAT_RATE", reason))?;

    let failure_policy = or_default("PRICEWATCH_FAILURE_POLICY", "isolate")
        .parse::<FailurePolicy>()
        .map_err(|reason| invalid("PRICEWATCH_FAILURE_POLICY", reason))?;

    Ok(AppConfig {
        env,
        log_level,
        targets_path,
        request_timeout_secs,
        user_agent,
        max_concurrent_fetches,
        max_retries,
        retry_backoff_base_secs,
        vat_rate,
        failure_policy,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parses a fractional VAT rate. Rejects negative and non-finite values.
///
/// # Errors
///
/// Returns a human-readable reason when the value is unusable.
pub fn parse_vat_rate(raw: &str) -> Result<f64, String> {
    let rate = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("VAT rate must be a finite, non-negative fraction, got {raw}"));
    }
    Ok(rate)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
