//! Rule registry and selection
//!
//! Rules are registered explicitly; [`RuleRegistry::with_defaults`] runs the
//! built-in catalog's registration functions.

use crate::catalog;
use crate::environment::Environment;
use crate::rule::Rule;

/// Ordered collection of validation rules
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create registry with the built-in rule catalog
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        catalog::register_all(&mut registry);
        registry
    }

    /// Register a rule
    ///
    /// Returns `false` and leaves the registry unchanged when a rule with the
    /// same module and name already exists.
    pub fn register(&mut self, rule: Rule) -> bool {
        if self.contains(&rule.qualified_name()) {
            tracing::warn!(rule = %rule.qualified_name(), "duplicate rule registration ignored");
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Check if a rule is registered under `module.name`
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.rules.iter().any(|r| r.qualified_name() == qualified_name)
    }

    /// Qualified names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(Rule::qualified_name).collect()
    }

    /// Distinct module names in registration order
    #[must_use]
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !modules.contains(&rule.module()) {
                modules.push(rule.module());
            }
        }
        modules
    }

    /// Number of registered rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// No rules registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over all rules
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Split rules into those selected for `environment` and those filtered
    /// out by their environment restriction.
    ///
    /// Rules not matching the module/name filters are dropped silently.
    #[must_use]
    pub fn select(&self, selection: &RuleSelection, environment: Environment) -> SelectedRules<'_> {
        let mut selected = SelectedRules::default();
        for rule in self.rules.iter().filter(|r| selection.matches(r)) {
            if rule.applies_to(environment) {
                selected.rules.push(rule);
            } else {
                selected.filtered_out.push(rule);
            }
        }
        selected
    }
}

/// Module and name substring filters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleSelection {
    module: Option<String>,
    name: Option<String>,
}

impl RuleSelection {
    /// Select every rule
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep rules whose module contains `module`
    #[inline]
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Keep rules whose name contains `name`
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether `rule` passes both filters
    #[must_use]
    pub fn matches(&self, rule: &Rule) -> bool {
        self.module.as_deref().map_or(true, |m| rule.module().contains(m))
            && self.name.as_deref().map_or(true, |n| rule.name().contains(n))
    }
}

/// Outcome of [`RuleRegistry::select`]
#[derive(Debug, Default)]
pub struct SelectedRules<'r> {
    /// Rules to run
    pub rules: Vec<&'r Rule>,
    /// Rules skipped because they are restricted to another environment
    pub filtered_out: Vec<&'r Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ValidationRuleInput;
    use crate::rule::{RuleCheck, RuleOutcome};

    fn pass(_: &ValidationRuleInput) -> RuleOutcome {
        RuleOutcome::Pass
    }

    fn rule(module: &str, name: &str) -> Rule {
        Rule::new(module, name, "test rule", RuleCheck::General(pass))
    }

    #[test]
    fn registry_new_empty() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = RuleRegistry::with_defaults();
        assert!(!registry.is_empty());
        assert!(registry.contains("scheduling.channel_naming.check_channel_names_are_correct"));
        assert!(registry.modules().contains(&"regulatory.xband"));
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = RuleRegistry::new();
        assert!(registry.register(rule("a", "x")));
        assert!(!registry.register(rule("a", "x")));
        assert!(registry.register(rule("b", "x")));
        assert_eq!(registry.names(), vec!["a.x".to_string(), "b.x".to_string()]);
    }

    #[test]
    fn selection_by_substring() {
        let mut registry = RuleRegistry::new();
        registry.register(rule("scheduling.flags", "enabled_false"));
        registry.register(rule("scheduling.flags", "legal_false"));
        registry.register(rule("regulatory.xband", "shared_set"));

        let by_module = registry.select(&RuleSelection::all().with_module("sched"), Environment::Staging);
        assert_eq!(by_module.rules.len(), 2);

        let by_name = registry.select(&RuleSelection::all().with_name("legal"), Environment::Staging);
        assert_eq!(by_name.rules.len(), 1);
        assert_eq!(by_name.rules[0].name(), "legal_false");

        let both = registry.select(
            &RuleSelection::all().with_module("regulatory").with_name("legal"),
            Environment::Staging,
        );
        assert!(both.rules.is_empty());
    }

    #[test]
    fn selection_filters_by_environment() {
        let mut registry = RuleRegistry::new();
        registry.register(rule("m", "everywhere"));
        registry.register(rule("m", "prod").only_in(Environment::Production));

        let staging = registry.select(&RuleSelection::all(), Environment::Staging);
        assert_eq!(staging.rules.len(), 1);
        assert_eq!(staging.filtered_out.len(), 1);
        assert_eq!(staging.filtered_out[0].name(), "prod");

        let production = registry.select(&RuleSelection::all(), Environment::Production);
        assert_eq!(production.rules.len(), 2);
        assert!(production.filtered_out.is_empty());
    }
}
