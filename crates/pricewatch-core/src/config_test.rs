use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PRICEWATCH_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.targets_path.to_str(), Some("./targets.json"));
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "pricewatch/0.1 (price-monitor)");
    assert_eq!(cfg.max_concurrent_fetches, 8);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
    assert!((cfg.vat_rate - 0.2).abs() < f64::EPSILON);
    assert_eq!(cfg.failure_policy, FailurePolicy::Isolate);
}

#[test]
fn targets_path_override() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_TARGETS_PATH", "/etc/pricewatch/targets.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.targets_path.to_str(),
        Some("/etc/pricewatch/targets.yaml")
    );
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(PRICEWATCH_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_concurrent_fetches_override() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_MAX_CONCURRENT_FETCHES", "32");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_fetches, 32);
}

#[test]
fn max_concurrent_fetches_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_MAX_CONCURRENT_FETCHES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_MAX_CONCURRENT_FETCHES"),
        "expected InvalidEnvVar(PRICEWATCH_MAX_CONCURRENT_FETCHES), got: {result:?}"
    );
}

#[test]
fn max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_MAX_RETRIES"),
        "expected InvalidEnvVar(PRICEWATCH_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn vat_rate_override() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_VAT_RATE", "0.05");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.vat_rate - 0.05).abs() < f64::EPSILON);
}

#[test]
fn vat_rate_negative_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_VAT_RATE", "-0.2");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_VAT_RATE"),
        "expected InvalidEnvVar(PRICEWATCH_VAT_RATE), got: {result:?}"
    );
}

#[test]
fn parse_vat_rate_rejects_nan() {
    assert!(parse_vat_rate("NaN").is_err());
    assert!(parse_vat_rate("inf").is_err());
}

#[test]
fn failure_policy_fail_fast() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_FAILURE_POLICY", "fail-fast");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.failure_policy, FailurePolicy::FailFast);
}

#[test]
fn failure_policy_unknown_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_FAILURE_POLICY", "yolo");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_FAILURE_POLICY"),
        "expected InvalidEnvVar(PRICEWATCH_FAILURE_POLICY), got: {result:?}"
    );
}
