use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One page tracked within a [`TargetGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub name: String,
}

/// A product tracked across one or more endpoints, sharing one extraction
/// method and one VAT treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub name: String,
    pub method: String,
    /// Whether the price shown on the page already includes VAT.
    #[serde(rename = "vat", alias = "vat_included", default)]
    pub vat_included: bool,
    /// Inline selector; takes precedence over the method table when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(rename = "urls", alias = "endpoints", default)]
    pub endpoints: Vec<Endpoint>,
}

/// Parsed contents of a targets file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsFile {
    /// Method identifier → selector, merged over the built-in table.
    #[serde(default)]
    pub methods: BTreeMap<String, String>,
    #[serde(default)]
    pub targets: Vec<TargetGroup>,
}

impl TargetsFile {
    /// Total number of endpoints across every group.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.targets.iter().map(|t| t.endpoints.len()).sum()
    }
}

/// Accepts both the document form and a bare list of groups.
///
/// `List` comes first: derived struct impls also accept sequences, so a bare
/// array must never be offered to `Document`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTargets {
    List(Vec<TargetGroup>),
    Document(TargetsFile),
}

impl From<RawTargets> for TargetsFile {
    fn from(raw: RawTargets) -> Self {
        match raw {
            RawTargets::Document(file) => file,
            RawTargets::List(targets) => TargetsFile {
                methods: BTreeMap::new(),
                targets,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetsFormat {
    Json,
    Yaml,
}

impl TargetsFormat {
    /// `.yaml` / `.yml` select YAML; everything else is read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                TargetsFormat::Yaml
            }
            _ => TargetsFormat::Json,
        }
    }
}

/// Load and validate target groups from a JSON or YAML file.
///
/// A missing file is not an error: a warning is logged and an empty
/// [`TargetsFile`] is returned, so the run proceeds with zero work.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "targets file not found; nothing to scrape"
            );
            return Ok(TargetsFile::default());
        }
        Err(e) => {
            return Err(ConfigError::TargetsFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    parse_targets(&content, TargetsFormat::from_path(path))
}

/// Parse and validate targets from an in-memory document.
///
/// # Errors
///
/// Returns `ConfigError` if the document does not parse or fails validation.
pub fn parse_targets(content: &str, format: TargetsFormat) -> Result<TargetsFile, ConfigError> {
    let raw: RawTargets = match format {
        TargetsFormat::Json => serde_json::from_str(content)?,
        TargetsFormat::Yaml => serde_yaml::from_str(content)?,
    };
    let file = TargetsFile::from(raw);
    validate_targets(&file)?;
    Ok(file)
}

fn validate_targets(file: &TargetsFile) -> Result<(), ConfigError> {
    for (method, selector) in &file.methods {
        if method.trim().is_empty() {
            return Err(ConfigError::Validation(
                "method identifiers must be non-empty".to_string(),
            ));
        }
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "method '{method}' has an empty selector"
            )));
        }
    }

    for group in &file.targets {
        if group.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target name must be non-empty".to_string(),
            ));
        }

        if group.method.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty method",
                group.name
            )));
        }

        if group.selector.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty selector",
                group.name
            )));
        }

        if group.endpoints.is_empty() {
            tracing::warn!(group = %group.name, "target has no urls and will produce no results");
        }

        for endpoint in &group.endpoints {
            if endpoint.url.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "target '{}' has an endpoint with an empty url",
                    group.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
