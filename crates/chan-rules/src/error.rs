//! Error types for naming, schema checks, template checks and rule runs

use std::fmt::Write as _;

use crate::engine::RuleViolation;

/// Classification annotations do not describe a nameable channel
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// No major class prefix matches the radio band booleans
    #[error("no known major class prefix for classification annotations {annotations}")]
    UnknownMajorClass { annotations: String },

    /// A section of the name needs an annotation that is not set
    #[error("classification annotation '{0}' is required to derive the channel name")]
    MissingAnnotation(String),
}

/// A document failed JSON-Schema validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaValidationError {
    /// The schema itself could not be compiled
    #[error("invalid schema '{key}': {message}")]
    InvalidSchema { key: String, message: String },

    /// The document does not conform
    #[error("Validation error: {message} (best match of {count} errors found while validating {location})")]
    Invalid {
        location: String,
        message: String,
        count: usize,
    },
}

/// Template files disagree with each other or with asset configs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateValidationError {
    /// A channel is in one template file but not the other
    #[error("{channel} is in {present_in} but not {absent_from}")]
    ChannelSetMismatch {
        channel: String,
        present_in: String,
        absent_from: String,
    },

    /// Two GS template channels share classification annotations
    #[error("In {file} channels {first} and {second} have the same classification annotations")]
    DuplicateAnnotations {
        file: String,
        first: String,
        second: String,
    },

    /// An asset configures a channel that no template defines
    #[error("Channel ID {channel} in {asset} is absent from {template_file}")]
    UnknownChannel {
        channel: String,
        asset: String,
        template_file: String,
    },
}

/// One or more ENFORCE rules failed
///
/// Carries every enforced violation of the run; COMPLAIN violations are
/// reported separately and never end up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", format_violations(.violations))]
pub struct RuleViolationError {
    violations: Vec<RuleViolation>,
}

impl RuleViolationError {
    /// Wrap the enforced violations of a run
    #[must_use]
    pub fn new(violations: Vec<RuleViolation>) -> Self {
        Self { violations }
    }

    /// The enforced violations
    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[RuleViolation] {
        &self.violations
    }
}

fn format_violations(violations: &[RuleViolation]) -> String {
    let mut out = String::from("One or more enforced validation rules failed");
    for violation in violations {
        let _ = write!(
            out,
            "\n  {}.{}: {}",
            violation.module, violation.name, violation.description
        );
        for case in &violation.cases {
            let _ = write!(out, "\n    - {case}");
        }
    }
    out
}

/// Combined validation error
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    #[error(transparent)]
    Template(#[from] TemplateValidationError),

    #[error(transparent)]
    Violation(#[from] RuleViolationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleMode;

    #[test]
    fn template_error_display() {
        let err = TemplateValidationError::UnknownChannel {
            channel: "X".to_string(),
            asset: "FM1".to_string(),
            template_file: "sat_templates.yaml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Channel ID X in FM1 is absent from sat_templates.yaml"
        );
    }

    #[test]
    fn violation_error_lists_cases() {
        let err = RuleViolationError::new(vec![RuleViolation {
            module: "scheduling.flags".to_string(),
            name: "must_be_off".to_string(),
            description: "Flags must be off".to_string(),
            mode: RuleMode::Enforce,
            cases: vec!["A on gs1".to_string(), "B on gs2".to_string()],
        }]);
        let text = err.to_string();
        assert!(text.starts_with("One or more enforced validation rules failed"));
        assert!(text.contains("scheduling.flags.must_be_off: Flags must be off"));
        assert!(text.contains("- A on gs1"));
        assert!(text.contains("- B on gs2"));
    }

    #[test]
    fn violation_error_renders_exact_text() {
        let err = RuleViolationError::new(vec![RuleViolation {
            module: "link.profile".to_string(),
            name: "elevation_floor".to_string(),
            description: "Elevation at least 5".to_string(),
            mode: RuleMode::Enforce,
            cases: vec!["FM1 C".to_string()],
        }]);
        assert_eq!(
            err.to_string(),
            "One or more enforced validation rules failed\n  link.profile.elevation_floor: Elevation at least 5\n    - FM1 C"
        );
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn error_conversions() {
        let err: RulesError = NamingError::MissingAnnotation("provider".to_string()).into();
        assert!(matches!(err, RulesError::Naming(_)));
    }
}
