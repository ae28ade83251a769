//! `pricewatch check` and `pricewatch methods`: inspect configuration
//! without touching the network.

use std::path::Path;

use pricewatch_core::{AppConfig, TargetsFile};
use pricewatch_scraper::SelectorRegistry;

use crate::scrape::targets_path;

/// Resolves every group's rule and syntax-checks it, returning one message
/// per problem found.
pub(crate) fn find_problems(targets: &TargetsFile, registry: &SelectorRegistry) -> Vec<String> {
    let mut problems = Vec::new();

    for (method, rule) in registry.iter() {
        if let Err(e) = rule.compile() {
            problems.push(format!("method {method}: {e}"));
        }
    }

    for group in &targets.targets {
        match registry.rule_for_group(group) {
            Ok(rule) => {
                // Registered rules were already reported above.
                if group.selector.is_some() {
                    if let Err(e) = rule.compile() {
                        problems.push(format!("group {}: {e}", group.name));
                    }
                }
            }
            Err(e) => problems.push(format!("group {}: {e}", group.name)),
        }
    }

    problems
}

/// Loads the targets file and reports whether a scrape would be able to
/// resolve every group.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be parsed, or any
/// group's method or selector is unusable.
pub(crate) fn run_check(config: &AppConfig, flag: Option<&Path>) -> anyhow::Result<()> {
    let path = targets_path(config, flag);
    if !path.exists() {
        anyhow::bail!("targets file {} does not exist", path.display());
    }

    let targets = pricewatch_core::load_targets(&path)?;
    let registry = SelectorRegistry::from_targets(&targets);
    let problems = find_problems(&targets, &registry);

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("{problem}");
        }
        anyhow::bail!(
            "{} problem(s) found in {}",
            problems.len(),
            path.display()
        );
    }

    println!(
        "{}: {} groups, {} endpoints, {} methods available",
        path.display(),
        targets.targets.len(),
        targets.endpoint_count(),
        registry.len()
    );
    Ok(())
}

/// Prints the built-in method table, one `method<TAB>selector` per line.
pub(crate) fn run_methods() {
    for (method, rule) in SelectorRegistry::builtin().iter() {
        println!("{method}\t{rule}");
    }
}
