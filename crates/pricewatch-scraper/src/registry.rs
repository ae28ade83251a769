//! Method identifier → CSS selector table.
//!
//! The registry is assembled once per run from the built-in table and the
//! `methods` section of the targets file, then shared read-only by every
//! endpoint task.

use std::collections::BTreeMap;

use pricewatch_core::{TargetGroup, TargetsFile};
use scraper::Selector;

use crate::error::ScraperError;

/// Selectors for storefronts tracked out of the box.
const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "netxl",
        "body div.wrapper div.product-top div div.left div.product-cost p span:nth-child(1)",
    ),
    (
        "wifi-stock",
        "#det_price table tbody tr:nth-child(2) td:nth-child(2)",
    ),
    (
        "senetic",
        "#lewa div div.product-main-info div.product-prices div:nth-child(8) span:nth-child(1)",
    ),
    (
        "senetic2",
        "#lewa div div.product-main-info div.product-prices div:nth-child(5) span:nth-child(1)",
    ),
    ("4gon", "#price_gross strong"),
    ("comms-express", "#vat"),
    (
        "alternate",
        "#pageContent table:nth-child(3) tbody tr td.productShort div:nth-child(3) p.price",
    ),
    ("voipon", "#price_gross strong"),
];

/// A CSS selector expected to match the node(s) holding a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRule(String);

impl ExtractionRule {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the selector.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the expression is not
    /// valid CSS selector syntax.
    pub fn compile(&self) -> Result<Selector, ScraperError> {
        Selector::parse(&self.0).map_err(|e| ScraperError::InvalidSelector {
            selector: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Display for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    rules: BTreeMap<String, ExtractionRule>,
}

impl SelectorRegistry {
    /// A registry with no rules at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in storefront table.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(method, selector)| ((*method).to_owned(), ExtractionRule::new(*selector)))
            .collect();
        Self { rules }
    }

    /// Built-in table overlaid with the targets file's `methods` section.
    #[must_use]
    pub fn from_targets(file: &TargetsFile) -> Self {
        Self::builtin().with_methods(&file.methods)
    }

    /// Adds or replaces rules. Later entries win over existing ones.
    #[must_use]
    pub fn with_methods(mut self, methods: &BTreeMap<String, String>) -> Self {
        for (method, selector) in methods {
            if self.rules.contains_key(method) {
                tracing::debug!(method, "targets file overrides built-in selector");
            }
            self.rules
                .insert(method.clone(), ExtractionRule::new(selector.clone()));
        }
        self
    }

    /// Looks up the rule for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UnknownMethod`] if no rule is registered.
    pub fn resolve(&self, method: &str) -> Result<&ExtractionRule, ScraperError> {
        self.rules
            .get(method)
            .ok_or_else(|| ScraperError::UnknownMethod {
                method: method.to_owned(),
            })
    }

    /// The rule a group should be scraped with, in order of precedence:
    /// its inline selector, the registered rule for its method, or the
    /// method string itself when that parses as a selector. The last form
    /// is how bare-array targets files name their selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UnknownMethod`] when the group has no inline
    /// selector, its method is not registered, and the method is not a
    /// valid selector either.
    pub fn rule_for_group(&self, group: &TargetGroup) -> Result<ExtractionRule, ScraperError> {
        if let Some(selector) = group.selector.as_deref() {
            return Ok(ExtractionRule::new(selector));
        }

        match self.resolve(&group.method) {
            Ok(rule) => Ok(rule.clone()),
            Err(unknown) => {
                let literal = ExtractionRule::new(group.method.as_str());
                if literal.compile().is_err() {
                    return Err(unknown);
                }
                tracing::debug!(
                    group = %group.name,
                    method = %group.method,
                    "unregistered method used as a literal selector"
                );
                Ok(literal)
            }
        }
    }

    /// Checks that every registered selector parses.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScraperError::InvalidSelector`] found.
    pub fn validate(&self) -> Result<(), ScraperError> {
        for rule in self.rules.values() {
            rule.compile()?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractionRule)> {
        self.rules.iter().map(|(method, rule)| (method.as_str(), rule))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(method: &str, selector: Option<&str>) -> TargetGroup {
        TargetGroup {
            name: "UAP-AC-PRO".to_owned(),
            method: method.to_owned(),
            vat_included: true,
            selector: selector.map(str::to_owned),
            endpoints: vec![],
        }
    }

    #[test]
    fn builtin_resolves_known_method() {
        let registry = SelectorRegistry::builtin();
        assert_eq!(
            registry.resolve("4gon").unwrap().as_str(),
            "#price_gross strong"
        );
    }

    #[test]
    fn unknown_method_is_an_error() {
        let registry = SelectorRegistry::builtin();
        let err = registry.resolve("no-such-shop").unwrap_err();
        assert!(
            matches!(err, ScraperError::UnknownMethod { ref method } if method == "no-such-shop")
        );
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = SelectorRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.resolve("4gon").is_err());
    }

    #[test]
    fn targets_methods_override_builtin() {
        let mut methods = BTreeMap::new();
        methods.insert("4gon".to_owned(), "span.price".to_owned());
        methods.insert("shop".to_owned(), "#cost".to_owned());
        let registry = SelectorRegistry::builtin().with_methods(&methods);
        assert_eq!(registry.resolve("4gon").unwrap().as_str(), "span.price");
        assert_eq!(registry.resolve("shop").unwrap().as_str(), "#cost");
        assert_eq!(registry.len(), BUILTIN_RULES.len() + 1);
    }

    #[test]
    fn inline_selector_takes_precedence() {
        let registry = SelectorRegistry::builtin();
        let rule = registry
            .rule_for_group(&group("4gon", Some("div.inline")))
            .unwrap();
        assert_eq!(rule.as_str(), "div.inline");
    }

    #[test]
    fn inline_selector_covers_unregistered_method() {
        let registry = SelectorRegistry::empty();
        let rule = registry
            .rule_for_group(&group("anything", Some("#p")))
            .unwrap();
        assert_eq!(rule.as_str(), "#p");
    }

    #[test]
    fn group_without_selector_uses_method() {
        let registry = SelectorRegistry::builtin();
        let rule = registry.rule_for_group(&group("comms-express", None)).unwrap();
        assert_eq!(rule.as_str(), "#vat");
    }

    #[test]
    fn unregistered_method_is_used_as_selector() {
        let registry = SelectorRegistry::builtin();
        let rule = registry
            .rule_for_group(&group("#price_gross strong", None))
            .unwrap();
        assert_eq!(rule.as_str(), "#price_gross strong");

        let rule = registry.rule_for_group(&group("strong", None)).unwrap();
        assert_eq!(rule.as_str(), "strong");
    }

    #[test]
    fn registered_method_wins_over_literal_selector() {
        let mut methods = BTreeMap::new();
        methods.insert("strong".to_owned(), "span.price".to_owned());
        let registry = SelectorRegistry::empty().with_methods(&methods);
        let rule = registry.rule_for_group(&group("strong", None)).unwrap();
        assert_eq!(rule.as_str(), "span.price");
    }

    #[test]
    fn method_that_is_neither_registered_nor_a_selector_is_unknown() {
        // Identifiers cannot start with a digit, so this is not a type selector.
        let registry = SelectorRegistry::builtin();
        let err = registry.rule_for_group(&group("3com", None)).unwrap_err();
        assert!(
            matches!(err, ScraperError::UnknownMethod { ref method } if method == "3com"),
            "expected UnknownMethod, got: {err:?}"
        );
    }

    #[test]
    fn builtin_selectors_all_parse() {
        SelectorRegistry::builtin().validate().unwrap();
    }

    #[test]
    fn validate_reports_broken_selector() {
        let mut methods = BTreeMap::new();
        methods.insert("broken".to_owned(), "div[".to_owned());
        let registry = SelectorRegistry::builtin().with_methods(&methods);
        let err = registry.validate().unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidSelector { ref selector, .. } if selector == "div[")
        );
    }
}
