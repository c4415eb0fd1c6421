//! Channel validation
//!
//! - [`naming`]: canonical channel ids derived from classification annotations
//! - [`schema`]: draft-7 JSON-Schema checks of channel records
//! - [`templates`]: consistency between template files and asset configs
//! - [`RuleRegistry`] / [`RuleEngine`]: scope-dispatched validation rules
//!   with ENFORCE/COMPLAIN modes and environment restrictions
//!
//! # Example
//!
//! ```
//! use chan_rules::{Environment, RuleEngine, RuleRegistry, ValidationRuleInput};
//!
//! let registry = RuleRegistry::with_defaults();
//! let input = ValidationRuleInput::new(Environment::Staging);
//! let report = RuleEngine::new(&registry).run(&input);
//! assert!(report.passed());
//! ```

mod catalog;
pub mod engine;
pub mod environment;
pub mod error;
pub mod input;
pub mod naming;
pub mod registry;
pub mod rule;
pub mod schema;
pub mod templates;

pub use engine::{run_rule, RuleEngine, RuleResult, RuleViolation, ValidationReport};
pub use environment::{AssetKind, Environment, UnknownEnvironment};
pub use error::{NamingError, RuleViolationError, RulesError, SchemaValidationError, TemplateValidationError};
pub use input::{AssetConfig, ClassAnnotationMap, ValidationRuleInput};
pub use naming::{class_annos_to_name, MajorClass};
pub use registry::{RuleRegistry, RuleSelection};
pub use rule::{Rule, RuleCheck, RuleMode, RuleOutcome};
pub use schema::{SchemaSet, SchemaValidator};
