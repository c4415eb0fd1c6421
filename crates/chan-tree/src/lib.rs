//! Channel tree algebra
//!
//! Pure operations over semi-structured channel definitions:
//! - [`merge`]: deep union, right side wins on scalar conflicts
//! - [`remove`]: depth-first subtraction that collapses empties
//! - [`update`]: in-place value replacement that never adds keys
//! - [`Predicate`]: `<field> <comparator> <value>` filters scoping [`update`]
//! - [`lookup`] / [`set_path`]: dot-separated path access
//!
//! Channel definitions are held as [`serde_json::Value`] so YAML and JSON
//! sources share one representation.

pub mod algebra;
pub mod error;
pub mod path;
pub mod predicate;

pub use algebra::{is_truthy, merge, remove, update};
pub use error::{PredicateError, TreeError};
pub use path::{lookup, set_path};
pub use predicate::{all_match, Comparator, Literal, Predicate};

/// A channel value: scalar, sequence, or string-keyed mapping.
pub type ChannelValue = serde_json::Value;

/// A single channel's configuration, keyed by schema field name.
pub type ChannelRecord = serde_json::Map<String, ChannelValue>;

/// Short kind name used in error messages.
#[must_use]
pub fn kind_of(value: &ChannelValue) -> &'static str {
    match value {
        ChannelValue::Object(_) => "mapping",
        ChannelValue::Array(_) => "sequence",
        ChannelValue::String(_) => "string",
        ChannelValue::Number(_) => "number",
        ChannelValue::Bool(_) => "boolean",
        ChannelValue::Null => "null",
    }
}
