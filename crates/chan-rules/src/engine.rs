//! Rule execution and aggregation
//!
//! Every selected rule runs to completion over its whole scope before any
//! result is judged, so a run surfaces all violations rather than the first.
//!
//! Violation-case labels:
//! - template channel: `<channel>`
//! - asset channel: `<channel> on <asset>`
//! - asset: `<asset>`
//! - general: `general`
//!
//! each followed by `: <reason>` when the rule gave one.

use crate::environment::Environment;
use crate::error::RuleViolationError;
use crate::input::{configured_channels, AssetConfig, ValidationRuleInput};
use crate::registry::{RuleRegistry, RuleSelection};
use crate::rule::{AssetChannelCheck, AssetCheck, Rule, RuleCheck, RuleMode, RuleOutcome};

/// Aggregated failure of one rule across its scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Module the rule was registered under
    pub module: String,
    /// Rule name
    pub name: String,
    /// Rule description
    pub description: String,
    /// Rule severity
    pub mode: RuleMode,
    /// One label per failing scope instance
    pub cases: Vec<String>,
}

/// Result of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    /// Module the rule was registered under
    pub module: String,
    /// Rule name
    pub name: String,
    /// `None` when the rule passed everywhere
    pub violation: Option<RuleViolation>,
}

impl RuleResult {
    /// No case failed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violation.is_none()
    }
}

/// Results of one validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Environment the run validated
    pub environment: Environment,
    /// One result per executed rule, in execution order
    pub results: Vec<RuleResult>,
    /// Rules skipped by their environment restriction
    pub filtered_out: Vec<String>,
}

impl ValidationReport {
    /// `true` if no ENFORCE rule failed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.enforced().next().is_none()
    }

    /// ENFORCE violations
    pub fn enforced(&self) -> impl Iterator<Item = &RuleViolation> {
        self.violations(RuleMode::Enforce)
    }

    /// COMPLAIN violations
    pub fn complaints(&self) -> impl Iterator<Item = &RuleViolation> {
        self.violations(RuleMode::Complain)
    }

    fn violations(&self, mode: RuleMode) -> impl Iterator<Item = &RuleViolation> {
        self.results
            .iter()
            .filter_map(|r| r.violation.as_ref())
            .filter(move |v| v.mode == mode)
    }

    /// Fail with every ENFORCE violation, or hand the report back
    ///
    /// # Errors
    /// Returns [`RuleViolationError`] if any ENFORCE rule failed.
    pub fn into_result(self) -> Result<Self, RuleViolationError> {
        let enforced: Vec<RuleViolation> = self.enforced().cloned().collect();
        if enforced.is_empty() {
            Ok(self)
        } else {
            Err(RuleViolationError::new(enforced))
        }
    }
}

/// Runs registry rules against a validation input
#[derive(Debug, Clone)]
pub struct RuleEngine<'r> {
    registry: &'r RuleRegistry,
    selection: RuleSelection,
}

impl<'r> RuleEngine<'r> {
    /// Engine running every rule of `registry`
    #[must_use]
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            selection: RuleSelection::all(),
        }
    }

    /// Restrict the rules that run
    #[inline]
    #[must_use]
    pub fn with_selection(mut self, selection: RuleSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Run every selected rule for the input's environment
    #[must_use]
    pub fn run(&self, input: &ValidationRuleInput) -> ValidationReport {
        let selected = self.registry.select(&self.selection, input.environment);

        let mut report = ValidationReport {
            environment: input.environment,
            ..ValidationReport::default()
        };

        for rule in &selected.filtered_out {
            tracing::info!(
                rule = %rule.qualified_name(),
                environment = %input.environment,
                "rule filtered out by environment restriction"
            );
            report.filtered_out.push(rule.qualified_name());
        }

        for rule in selected.rules {
            let result = run_rule(rule, input);
            match &result.violation {
                None => tracing::debug!(rule = %rule.qualified_name(), "rule passed"),
                Some(v) => tracing::debug!(
                    rule = %rule.qualified_name(),
                    cases = v.cases.len(),
                    mode = %v.mode,
                    "rule failed"
                ),
            }
            report.results.push(result);
        }
        report
    }
}

/// Run one rule over its whole scope
#[must_use]
pub fn run_rule(rule: &Rule, input: &ValidationRuleInput) -> RuleResult {
    let cases = collect_cases(rule.check(), input);
    let violation = (!cases.is_empty()).then(|| RuleViolation {
        module: rule.module().to_string(),
        name: rule.name().to_string(),
        description: rule.description().to_string(),
        mode: rule.mode(),
        cases,
    });
    RuleResult {
        module: rule.module().to_string(),
        name: rule.name().to_string(),
        violation,
    }
}

fn collect_cases(check: RuleCheck, input: &ValidationRuleInput) -> Vec<String> {
    let mut cases = Vec::new();
    match check {
        RuleCheck::GroundStationTemplateChannel(f) => {
            template_cases(f, input, &input.gs_templates, &mut cases);
        }
        RuleCheck::SatelliteTemplateChannel(f) => {
            template_cases(f, input, &input.sat_templates, &mut cases);
        }
        RuleCheck::GroundStationChannel(f) => {
            for (asset, config) in &input.gs_configs {
                asset_channel_cases(f, input, asset, config, &mut cases);
            }
        }
        RuleCheck::SatelliteChannel(f) => {
            for (asset, config) in &input.sat_configs {
                asset_channel_cases(f, input, asset, config, &mut cases);
            }
        }
        RuleCheck::GroundStation(f) => {
            asset_cases(f, input, input.gs_configs.iter(), &mut cases);
        }
        RuleCheck::Satellite(f) => {
            asset_cases(f, input, input.sat_configs.iter(), &mut cases);
        }
        RuleCheck::General(f) => push_case(&mut cases, "general".to_string(), &f(input)),
    }
    cases
}

fn template_cases(
    f: crate::rule::TemplateChannelCheck,
    input: &ValidationRuleInput,
    templates: &AssetConfig,
    cases: &mut Vec<String>,
) {
    for (channel, record) in configured_channels(templates) {
        let annos = input.class_annos(channel);
        push_case(cases, channel.clone(), &f(input, channel, &annos, record));
    }
}

fn asset_channel_cases(
    f: AssetChannelCheck,
    input: &ValidationRuleInput,
    asset: &str,
    config: &AssetConfig,
    cases: &mut Vec<String>,
) {
    for (channel, record) in configured_channels(config) {
        let annos = input.class_annos(channel);
        let outcome = f(input, asset, channel, &annos, record);
        push_case(cases, format!("{channel} on {asset}"), &outcome);
    }
}

fn asset_cases<'a>(
    f: AssetCheck,
    input: &ValidationRuleInput,
    assets: impl Iterator<Item = (&'a String, &'a AssetConfig)>,
    cases: &mut Vec<String>,
) {
    let annos = input.class_annos_map();
    for (asset, config) in assets {
        push_case(cases, asset.clone(), &f(input, asset, config, &annos));
    }
}

fn push_case(cases: &mut Vec<String>, label: String, outcome: &RuleOutcome) {
    match outcome {
        RuleOutcome::Pass => {}
        RuleOutcome::Fail => cases.push(label),
        RuleOutcome::FailWith(reason) => cases.push(format!("{label}: {reason}")),
    }
}
