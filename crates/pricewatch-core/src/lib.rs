//! Shared domain types and configuration loading for pricewatch.
//!
//! Target groups are read from a JSON or YAML file (see [`load_targets`]);
//! runtime knobs come from the environment (see [`load_app_config`]).

pub mod app_config;
pub mod config;
pub mod targets;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, FailurePolicy};
pub use config::{load_app_config, load_app_config_from_env, parse_vat_rate};
pub use targets::{
    load_targets, parse_targets, Endpoint, TargetGroup, TargetsFile, TargetsFormat,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file as JSON: {0}")]
    TargetsFileParseJson(#[from] serde_json::Error),

    #[error("failed to parse targets file as YAML: {0}")]
    TargetsFileParseYaml(#[from] serde_yaml::Error),

    #[error("targets validation error: {0}")]
    Validation(String),
}
