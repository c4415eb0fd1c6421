//! Error types for tree operations and predicates

/// Errors raised by [`merge`](crate::merge), [`remove`](crate::remove) and
/// [`update`](crate::update)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The two operands have incompatible container shapes
    #[error("shape mismatch in {operation}: cannot combine {left} with {right}")]
    ShapeMismatch {
        /// `merge`, `remove` or `update`
        operation: &'static str,
        /// Kind of the left operand, as named by [`kind_of`](crate::kind_of)
        left: &'static str,
        /// Kind of the right operand
        right: &'static str,
    },

    /// A predicate failed while selecting sequence elements
    #[error(transparent)]
    Predicate(#[from] PredicateError),
}

impl TreeError {
    /// Create a shape mismatch error from the offending operands
    #[must_use]
    pub fn shape_mismatch(
        operation: &'static str,
        left: &crate::ChannelValue,
        right: &crate::ChannelValue,
    ) -> Self {
        let (left, right) = (crate::kind_of(left), crate::kind_of(right));
        tracing::debug!(operation, left, right, "shape mismatch");
        Self::ShapeMismatch { operation, left, right }
    }
}

/// Errors raised while compiling or evaluating a [`Predicate`](crate::Predicate)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    /// The expression does not have exactly three space-separated tokens
    #[error("malformed predicate '{text}': expected '<field> <comparator> <value>'")]
    Malformed { text: String },

    /// The comparator token is not recognised
    #[error("Invalid comparator {found}. Valid options are: {valid}")]
    UnknownComparator { found: String, valid: String },

    /// The record does not contain the predicate's field
    #[error("field '{0}' is missing from the record")]
    MissingField(String),

    /// The predicate was evaluated against something other than a mapping
    #[error("predicate '{predicate}' cannot be evaluated against a {actual}")]
    NotARecord {
        predicate: String,
        actual: &'static str,
    },

    /// An ordering comparator was applied to values of different kinds
    #[error("predicate '{predicate}' cannot order a {actual} field against its literal")]
    Incomparable {
        predicate: String,
        actual: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_mismatch_display() {
        let err = TreeError::shape_mismatch("merge", &json!([1]), &json!({"a": 1}));
        assert_eq!(
            err.to_string(),
            "shape mismatch in merge: cannot combine sequence with mapping"
        );
    }

    #[test]
    fn unknown_comparator_display() {
        let err = PredicateError::UnknownComparator {
            found: "=>".to_string(),
            valid: "<=, >=".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid comparator =>. Valid options are: <=, >=");
    }

    #[test]
    fn predicate_error_converts() {
        let err: TreeError = PredicateError::MissingField("x".to_string()).into();
        assert!(matches!(err, TreeError::Predicate(PredicateError::MissingField(_))));
    }
}
