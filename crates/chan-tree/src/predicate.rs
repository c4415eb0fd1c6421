//! Predicate mini-language
//!
//! A predicate is written `<field> <comparator> <value>` with single spaces
//! between the tokens, e.g. `min_elevation_deg >= 10`. The value is read as a
//! number when it parses as one and as text otherwise.
//!
//! Compiled predicates are a small AST ([`Predicate`]) rather than closures, so
//! they can be inspected and printed back.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PredicateError;

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl Comparator {
    /// Every comparator, in the order they are listed to users
    pub const ALL: [Self; 6] = [
        Self::LessOrEqual,
        Self::GreaterOrEqual,
        Self::Less,
        Self::Greater,
        Self::Equal,
        Self::NotEqual,
    ];

    /// Source text of the comparator
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Parse a comparator token
    #[must_use]
    pub fn from_symbol(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == token)
    }

    /// `true` for comparators that need an ordering between operands
    #[inline]
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }

    fn apply<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Self::LessOrEqual => left <= right,
            Self::GreaterOrEqual => left >= right,
            Self::Less => left < right,
            Self::Greater => left > right,
            Self::Equal => left == right,
            Self::NotEqual => left != right,
        }
    }

    fn valid_options() -> String {
        Self::ALL
            .iter()
            .map(|c| c.symbol())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand operand of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Token that parsed as a floating point number
    Number(f64),
    /// Any other token, compared as text
    Text(String),
}

impl Literal {
    fn parse(token: &str) -> Self {
        token
            .parse::<f64>()
            .map_or_else(|_| Self::Text(token.to_string()), Self::Number)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Compiled `<field> <comparator> <value>` filter
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    comparator: Comparator,
    literal: Literal,
}

impl Predicate {
    /// Build a predicate from its parts
    #[must_use]
    pub fn new(field: impl Into<String>, comparator: Comparator, literal: Literal) -> Self {
        Self {
            field: field.into(),
            comparator,
            literal,
        }
    }

    /// Compile a predicate from its text form
    ///
    /// # Errors
    /// - [`PredicateError::Malformed`] unless there are exactly three tokens
    /// - [`PredicateError::UnknownComparator`] for an unrecognised comparator
    ///
    /// # Examples
    /// ```
    /// # use chan_tree::{Comparator, Literal, Predicate};
    /// let p = Predicate::compile("x >= 10").unwrap();
    /// assert_eq!(p.field(), "x");
    /// assert_eq!(p.comparator(), Comparator::GreaterOrEqual);
    /// assert_eq!(p.literal(), &Literal::Number(10.0));
    /// ```
    pub fn compile(text: &str) -> Result<Self, PredicateError> {
        let tokens: Vec<&str> = text.split(' ').collect();
        let [field, comparator, value] = tokens.as_slice() else {
            return Err(PredicateError::Malformed {
                text: text.to_string(),
            });
        };

        let comparator =
            Comparator::from_symbol(comparator).ok_or_else(|| PredicateError::UnknownComparator {
                found: (*comparator).to_string(),
                valid: Comparator::valid_options(),
            })?;

        Ok(Self::new(*field, comparator, Literal::parse(value)))
    }

    /// Field the predicate reads
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Comparison operator
    #[inline]
    #[must_use]
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Right-hand literal
    #[inline]
    #[must_use]
    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    /// Evaluate against a record
    ///
    /// Numbers compare numerically and strings lexicographically. Values of
    /// any other pairing are never equal, and cannot be ordered.
    ///
    /// # Errors
    /// - [`PredicateError::NotARecord`] if `record` is not a mapping
    /// - [`PredicateError::MissingField`] if the field is absent
    /// - [`PredicateError::Incomparable`] for an ordering across kinds
    pub fn evaluate(&self, record: &Value) -> Result<bool, PredicateError> {
        let Value::Object(fields) = record else {
            return Err(PredicateError::NotARecord {
                predicate: self.to_string(),
                actual: crate::kind_of(record),
            });
        };
        let actual = fields
            .get(&self.field)
            .ok_or_else(|| PredicateError::MissingField(self.field.clone()))?;

        match (actual, &self.literal) {
            (Value::Number(n), Literal::Number(expected)) => match n.as_f64() {
                Some(n) => Ok(self.comparator.apply(&n, expected)),
                None => Err(self.incomparable(actual)),
            },
            (Value::String(s), Literal::Text(expected)) => {
                Ok(self.comparator.apply(s.as_str(), expected.as_str()))
            }
            _ if self.comparator.is_ordering() => Err(self.incomparable(actual)),
            _ => Ok(self.comparator == Comparator::NotEqual),
        }
    }

    fn incomparable(&self, actual: &Value) -> PredicateError {
        PredicateError::Incomparable {
            predicate: self.to_string(),
            actual: crate::kind_of(actual),
        }
    }
}

impl FromStr for Predicate {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// `true` when every predicate holds for `record`; vacuously true when empty.
///
/// # Errors
/// Propagates the first evaluation error.
pub fn all_match(predicates: &[Predicate], record: &Value) -> Result<bool, PredicateError> {
    for predicate in predicates {
        if !predicate.evaluate(record)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_comparison() {
        let p = Predicate::compile("x >= 10").unwrap();
        assert!(p.evaluate(&json!({"x": 10})).unwrap());
        assert!(!p.evaluate(&json!({"x": 9})).unwrap());
        assert!(p.evaluate(&json!({"x": 10.5})).unwrap());
    }

    #[test]
    fn text_comparison() {
        let p = Predicate::compile("x == foo").unwrap();
        assert!(p.evaluate(&json!({"x": "foo"})).unwrap());
        assert!(!p.evaluate(&json!({"x": "bar"})).unwrap());

        let p = Predicate::compile("band < T").unwrap();
        assert!(p.evaluate(&json!({"band": "SBAND"})).unwrap());
    }

    #[test]
    fn every_comparator_parses() {
        for comparator in Comparator::ALL {
            let text = format!("x {comparator} 1");
            let p = Predicate::compile(&text).unwrap();
            assert_eq!(p.comparator(), comparator);
        }
    }

    #[test]
    fn token_count_must_be_three() {
        for text in ["x >=", "x >= 10 extra", "", "x  >= 10"] {
            assert!(matches!(
                Predicate::compile(text),
                Err(PredicateError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn unknown_comparator_lists_valid_set() {
        let err = Predicate::compile("x => 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid comparator =>. Valid options are: <=, >=, <, >, ==, !="
        );
    }

    #[test]
    fn missing_field_errors() {
        let p = Predicate::compile("y == 1").unwrap();
        assert_eq!(
            p.evaluate(&json!({"x": 1})),
            Err(PredicateError::MissingField("y".to_string()))
        );
    }

    #[test]
    fn non_record_errors() {
        let p = Predicate::compile("y == 1").unwrap();
        assert!(matches!(
            p.evaluate(&json!([1])),
            Err(PredicateError::NotARecord { .. })
        ));
    }

    #[test]
    fn cross_kind_equality_is_false() {
        let eq = Predicate::compile("x == 10").unwrap();
        let ne = Predicate::compile("x != 10").unwrap();
        assert!(!eq.evaluate(&json!({"x": "10"})).unwrap());
        assert!(ne.evaluate(&json!({"x": "10"})).unwrap());

        let lt = Predicate::compile("x < 10").unwrap();
        assert!(matches!(
            lt.evaluate(&json!({"x": "10"})),
            Err(PredicateError::Incomparable { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        for text in ["x >= 10", "band == SBAND", "rate != 2.5"] {
            let p: Predicate = text.parse().unwrap();
            assert_eq!(p.to_string(), text);
            assert_eq!(Predicate::compile(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn all_match_is_conjunction() {
        let preds = vec![
            Predicate::compile("x >= 1").unwrap(),
            Predicate::compile("y == a").unwrap(),
        ];
        assert!(all_match(&preds, &json!({"x": 2, "y": "a"})).unwrap());
        assert!(!all_match(&preds, &json!({"x": 0, "y": "a"})).unwrap());
        assert!(all_match(&[], &json!({})).unwrap());
    }
}
