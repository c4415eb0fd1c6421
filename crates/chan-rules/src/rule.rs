//! Rule definitions
//!
//! A [`Rule`] pairs metadata (module, name, description, mode, optional
//! environment restriction) with a [`RuleCheck`]. The check's variant is the
//! rule's scope and fixes the signature of the function it carries, so the
//! engine can dispatch on it exhaustively.

use std::fmt;

use chan_tree::ChannelRecord;

use crate::environment::Environment;
use crate::input::{AssetConfig, ClassAnnotationMap, ValidationRuleInput};

/// Severity of a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RuleMode {
    /// Violations fail the run
    #[default]
    Enforce,
    /// Violations are reported as warnings only
    Complain,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enforce => "ENFORCE",
            Self::Complain => "COMPLAIN",
        })
    }
}

/// Result of one rule invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// No violation
    Pass,
    /// Violation without further detail
    Fail,
    /// Violation with a reason
    FailWith(String),
}

impl RuleOutcome {
    /// Violation with a reason
    #[must_use]
    pub fn fail_with(reason: impl Into<String>) -> Self {
        Self::FailWith(reason.into())
    }

    /// `true` for [`RuleOutcome::Pass`]
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Reason attached to a failure
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::FailWith(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<bool> for RuleOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl From<String> for RuleOutcome {
    fn from(reason: String) -> Self {
        Self::FailWith(reason)
    }
}

/// Template channel check: `(input, channel id, class annotations, record)`
pub type TemplateChannelCheck =
    fn(&ValidationRuleInput, &str, &ChannelRecord, &ChannelRecord) -> RuleOutcome;

/// Asset channel check: `(input, asset id, channel id, class annotations, record)`
pub type AssetChannelCheck =
    fn(&ValidationRuleInput, &str, &str, &ChannelRecord, &ChannelRecord) -> RuleOutcome;

/// Asset check: `(input, asset id, asset config, channel id to class annotations)`
pub type AssetCheck =
    fn(&ValidationRuleInput, &str, &AssetConfig, &ClassAnnotationMap) -> RuleOutcome;

/// General check, run once per validation
pub type GeneralCheck = fn(&ValidationRuleInput) -> RuleOutcome;

/// Rule body, tagged with the scope it iterates
#[derive(Clone, Copy)]
pub enum RuleCheck {
    /// Every channel of the GS templates
    GroundStationTemplateChannel(TemplateChannelCheck),
    /// Every channel of the satellite templates
    SatelliteTemplateChannel(TemplateChannelCheck),
    /// Every configured channel of every ground station
    GroundStationChannel(AssetChannelCheck),
    /// Every configured channel of every satellite
    SatelliteChannel(AssetChannelCheck),
    /// Every ground station
    GroundStation(AssetCheck),
    /// Every satellite
    Satellite(AssetCheck),
    /// Once per run
    General(GeneralCheck),
}

impl RuleCheck {
    /// Scope name of the check
    #[must_use]
    pub const fn scope(&self) -> &'static str {
        match self {
            Self::GroundStationTemplateChannel(_) => "groundstation_template_channel",
            Self::SatelliteTemplateChannel(_) => "satellite_template_channel",
            Self::GroundStationChannel(_) => "groundstation_channel",
            Self::SatelliteChannel(_) => "satellite_channel",
            Self::GroundStation(_) => "groundstation",
            Self::Satellite(_) => "satellite",
            Self::General(_) => "general",
        }
    }
}

impl fmt::Debug for RuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleCheck").field(&self.scope()).finish()
    }
}

/// A registered validation rule
#[derive(Debug, Clone)]
pub struct Rule {
    module: String,
    name: String,
    description: String,
    mode: RuleMode,
    environment: Option<Environment>,
    check: RuleCheck,
}

impl Rule {
    /// Create an ENFORCE rule that runs in every environment
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        check: RuleCheck,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            description: description.into(),
            mode: RuleMode::Enforce,
            environment: None,
            check,
        }
    }

    /// Set severity
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: RuleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restrict to a single environment
    #[inline]
    #[must_use]
    pub fn only_in(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Module the rule was registered under
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Rule name, unique within its module
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable statement of what the rule requires
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Severity
    #[inline]
    #[must_use]
    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    /// Environment restriction, `None` for every environment
    #[inline]
    #[must_use]
    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    /// Check function and the data it reads
    #[inline]
    #[must_use]
    pub fn check(&self) -> RuleCheck {
        self.check
    }

    /// `module.name`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// Whether the rule runs in `environment`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, environment: Environment) -> bool {
        self.environment.map_or(true, |only| only == environment)
    }
}
