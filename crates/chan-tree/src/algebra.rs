//! Merge, remove and update over channel trees
//!
//! All three operations are depth-first and return fresh values; inputs are
//! never mutated.
//!
//! # Shapes
//! Sequences combine with sequences and mappings with mappings. Any other
//! pairing of containers is a [`TreeError::ShapeMismatch`].

use serde_json::Value;

use crate::error::TreeError;
use crate::predicate::{all_match, Predicate};
use crate::ChannelRecord;

/// Combine two values, `b` taking priority on scalar conflicts.
///
/// - Sequences are concatenated and deduplicated by deep equality, keeping the
///   first occurrence. A result made only of strings is sorted.
/// - Mappings start from a copy of `a`. A key of `b` is merged recursively
///   only when `a` already holds a container there; otherwise `b`'s value
///   replaces it.
/// - Two scalars resolve to `b`.
///
/// # Errors
/// Returns [`TreeError::ShapeMismatch`] when the operands (or a pair of
/// nested containers) have different shapes.
///
/// # Examples
/// ```
/// # use serde_json::json;
/// let merged = chan_tree::merge(&json!({"a": ["y", "x"]}), &json!({"a": ["x", "z"]})).unwrap();
/// assert_eq!(merged, json!({"a": ["x", "y", "z"]}));
/// ```
pub fn merge(a: &Value, b: &Value) -> Result<Value, TreeError> {
    match (a, b) {
        (Value::Array(left), Value::Array(right)) => Ok(Value::Array(merge_sequences(left, right))),
        (Value::Object(left), Value::Object(right)) => {
            let mut result = left.clone();
            for (key, b_val) in right {
                let merged = match result.get(key) {
                    Some(a_val) if is_container(a_val) => merge(a_val, b_val)?,
                    _ => b_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Ok(Value::Object(result))
        }
        (left, right) if !is_container(left) && !is_container(right) => Ok(right.clone()),
        _ => Err(TreeError::shape_mismatch("merge", a, b)),
    }
}

fn merge_sequences(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut combined: Vec<Value> = Vec::with_capacity(left.len() + right.len());
    for item in left.iter().chain(right) {
        if !combined.contains(item) {
            combined.push(item.clone());
        }
    }

    if !combined.is_empty() && combined.iter().all(Value::is_string) {
        combined.sort_by(|x, y| x.as_str().cmp(&y.as_str()));
    }
    combined
}

/// Subtract `b`'s leaves from `a`.
///
/// Returns `None` when nothing of `a` remains at this level.
///
/// - Sequences drop every element deeply equal to some element of `b`.
///   Elements are removed whole; their children are never edited.
/// - Mappings recurse on each key shared with `b`. A key whose result is
///   absent or an empty container is deleted. The mapping itself is returned
///   even when it ends up empty; callers decide what an empty root means.
/// - Scalars equal to `b` are removed, otherwise kept.
///
/// # Errors
/// Returns [`TreeError::ShapeMismatch`] when a container meets a value of a
/// different shape.
pub fn remove(a: &Value, b: &Value) -> Result<Option<Value>, TreeError> {
    match (a, b) {
        (Value::Array(left), Value::Array(right)) => {
            let kept = left
                .iter()
                .filter(|item| !right.contains(item))
                .cloned()
                .collect();
            Ok(Some(Value::Array(kept)))
        }
        (Value::Object(left), Value::Object(right)) => {
            let mut result = left.clone();
            for (key, b_val) in right {
                let Some(a_val) = left.get(key) else {
                    continue;
                };
                match remove(a_val, b_val)? {
                    Some(kept) if !is_empty_container(&kept) => {
                        result.insert(key.clone(), kept);
                    }
                    _ => {
                        result.shift_remove(key);
                    }
                }
            }
            Ok(Some(Value::Object(result)))
        }
        (left, right) if !is_container(left) && !is_container(right) => {
            Ok((left != right).then(|| left.clone()))
        }
        _ => Err(TreeError::shape_mismatch("remove", a, b)),
    }
}

/// Overwrite existing values in `current` with those from `updates`.
///
/// Keys absent from `current` are never introduced.
///
/// - A sequence of mappings updated by a one-element sequence holding a
///   mapping treats that mapping as a template. Every element matching all
///   `predicates` has each of its existing fields updated from the
///   template's non-null values. Other elements are left as they are.
/// - Any other sequence update replaces `current` wholesale.
/// - Mappings recurse on each key of `updates` whose value is truthy and
///   which already exists in `current`. The recursion drops `predicates`;
///   they select elements only of a sequence reached directly or through a
///   selected element.
/// - Scalars are replaced by `updates`.
///
/// # Errors
/// Returns [`TreeError::ShapeMismatch`] when a container is updated with a
/// value of a different shape, and [`TreeError::Predicate`] when a predicate
/// cannot be evaluated against a selected element.
pub fn update(current: &Value, updates: &Value, predicates: &[Predicate]) -> Result<Value, TreeError> {
    match (current, updates) {
        (Value::Array(items), Value::Array(template)) => match template.as_slice() {
            [Value::Object(fields)] if items.iter().all(Value::is_object) => {
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    if all_match(predicates, item)? {
                        result.push(apply_template(item, fields, predicates)?);
                    } else {
                        result.push(item.clone());
                    }
                }
                Ok(Value::Array(result))
            }
            _ => Ok(updates.clone()),
        },
        (Value::Array(_), _) => Err(TreeError::shape_mismatch("update", current, updates)),
        (Value::Object(fields), Value::Object(changes)) => {
            let mut result = fields.clone();
            for (key, change) in changes {
                if !is_truthy(change) {
                    continue;
                }
                if let Some(existing) = fields.get(key) {
                    result.insert(key.clone(), update(existing, change, &[])?);
                }
            }
            Ok(Value::Object(result))
        }
        (Value::Object(_), _) => Err(TreeError::shape_mismatch("update", current, updates)),
        _ => Ok(updates.clone()),
    }
}

fn apply_template(
    item: &Value,
    template: &ChannelRecord,
    predicates: &[Predicate],
) -> Result<Value, TreeError> {
    let Value::Object(fields) = item else {
        return Ok(item.clone());
    };

    let mut result = fields.clone();
    for (field, value) in template {
        if value.is_null() {
            continue;
        }
        if let Some(existing) = fields.get(field) {
            result.insert(field.clone(), update(existing, value, predicates)?);
        }
    }
    Ok(Value::Object(result))
}

/// Truthiness used when deciding whether a mapping update applies.
///
/// Null, `false`, zero, and empty strings or containers are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[inline]
fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

#[inline]
fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn merge_numeric_lists_keep_first_seen_order() {
        let merged = merge(&json!([1, 2, 3]), &json!([3, 4, 5])).unwrap();
        assert_eq!(merged, json!([1, 2, 3, 4, 5]));

        let merged = merge(&json!({"a": [2, 1]}), &json!({"a": [1, 3]})).unwrap();
        assert_eq!(merged, json!({"a": [2, 1, 3]}));
    }

    #[test]
    fn merge_string_lists_are_sorted() {
        let merged = merge(&json!({"a": ["y", "x"]}), &json!({"a": ["x", "z"]})).unwrap();
        assert_eq!(merged, json!({"a": ["x", "y", "z"]}));
    }

    #[test]
    fn merge_scalars_are_replaced() {
        let merged = merge(&json!({"x": 1, "y": 2}), &json!({"y": 3, "z": 4})).unwrap();
        assert_eq!(merged, json!({"x": 1, "y": 3, "z": 4}));
    }

    #[test]
    fn merge_scalar_slot_takes_container_wholesale() {
        let merged = merge(&json!({"a": 1}), &json!({"a": {"b": 2}})).unwrap();
        assert_eq!(merged, json!({"a": {"b": 2}}));
    }

    #[test]
    fn merge_nested_mappings() {
        let a = json!({"w": {"forward": [{"band": "UHF"}], "mode": "x"}});
        let b = json!({"w": {"forward": [{"band": "SBAND"}], "mode": "y"}});
        let merged = merge(&a, &b).unwrap();
        assert_eq!(
            merged,
            json!({"w": {"forward": [{"band": "UHF"}, {"band": "SBAND"}], "mode": "y"}})
        );
    }

    #[test]
    fn merge_rejects_mismatched_shapes() {
        assert!(matches!(
            merge(&json!([1]), &json!({"a": 1})),
            Err(TreeError::ShapeMismatch { .. })
        ));
        assert!(merge(&json!({"a": [1]}), &json!({"a": {"b": 1}})).is_err());
        assert!(merge(&json!({"a": [1]}), &json!({"a": 2})).is_err());
    }

    #[test]
    fn remove_full_collapse() {
        let a = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(remove(&a, &a).unwrap(), Some(json!({})));
    }

    #[test]
    fn remove_partial_collapse_keeps_sibling() {
        let removed = remove(&json!({"a": {"a1": 1, "a2": 2}}), &json!({"a": {"a2": 2}})).unwrap();
        assert_eq!(removed, Some(json!({"a": {"a1": 1}})));
    }

    #[test]
    fn remove_nested_collapse_deletes_parent() {
        let removed = remove(&json!({"a": {"b": [1]}, "c": 1}), &json!({"a": {"b": [1]}})).unwrap();
        assert_eq!(removed, Some(json!({"c": 1})));
    }

    #[test]
    fn remove_sequence_whole_elements_only() {
        let a = json!([{"band": "UHF", "rate": 9}, {"band": "SBAND", "rate": 1}]);
        let partial = json!([{"band": "UHF"}]);
        assert_eq!(remove(&a, &partial).unwrap(), Some(a.clone()));

        let exact = json!([{"band": "UHF", "rate": 9}]);
        assert_eq!(
            remove(&a, &exact).unwrap(),
            Some(json!([{"band": "SBAND", "rate": 1}]))
        );
    }

    #[test]
    fn remove_unequal_scalar_is_kept() {
        let removed = remove(&json!({"a": 1, "b": 2}), &json!({"a": 5})).unwrap();
        assert_eq!(removed, Some(json!({"a": 1, "b": 2})));
        assert_eq!(remove(&json!("x"), &json!("x")).unwrap(), None);
    }

    #[test]
    fn remove_keeps_falsy_scalars_that_differ() {
        let removed = remove(&json!({"enabled": false, "n": 0}), &json!({"n": 1})).unwrap();
        assert_eq!(removed, Some(json!({"enabled": false, "n": 0})));
    }

    #[test]
    fn remove_rejects_mismatched_shapes() {
        assert!(remove(&json!({"a": [1]}), &json!({"a": {"b": 1}})).is_err());
        assert!(remove(&json!({"a": 1}), &json!({"a": [1]})).is_err());
    }

    #[test]
    fn update_template_skips_null_and_unknown_fields() {
        let updated = update(&json!([{"a": 1, "b": 2}]), &json!([{"b": 4, "c": null}]), &[]).unwrap();
        assert_eq!(updated, json!([{"a": 1, "b": 4}]));
    }

    #[test]
    fn update_respects_predicates() {
        let current = json!([
            {"min_elevation_deg": 5, "rate": 100},
            {"min_elevation_deg": 20, "rate": 100}
        ]);
        let predicates = vec![Predicate::compile("min_elevation_deg >= 10").unwrap()];
        let updated = update(&current, &json!([{"rate": 250}]), &predicates).unwrap();
        assert_eq!(
            updated,
            json!([
                {"min_elevation_deg": 5, "rate": 100},
                {"min_elevation_deg": 20, "rate": 250}
            ])
        );
    }

    #[test]
    fn update_predicates_stop_at_mappings() {
        let current = json!({"forward_channels": [
            {"radio_band": "UHF", "rate": 1},
            {"radio_band": "SBAND", "rate": 1}
        ]});
        let predicates = vec![Predicate::compile("min_elevation_deg >= 10").unwrap()];
        let updated = update(&current, &json!({"forward_channels": [{"rate": 9}]}), &predicates).unwrap();
        assert_eq!(
            updated,
            json!({"forward_channels": [
                {"radio_band": "UHF", "rate": 9},
                {"radio_band": "SBAND", "rate": 9}
            ]})
        );
    }

    #[test]
    fn update_predicates_reach_sequences_inside_selected_elements() {
        let current = json!([
            {"id": 1, "bands": [{"id": 1, "pls": 5}, {"id": 2, "pls": 5}]},
            {"id": 3, "bands": [{"id": 3, "pls": 5}]}
        ]);
        let predicates = vec![Predicate::compile("id <= 2").unwrap()];
        let updated = update(&current, &json!([{"bands": [{"pls": 9}]}]), &predicates).unwrap();
        assert_eq!(
            updated,
            json!([
                {"id": 1, "bands": [{"id": 1, "pls": 9}, {"id": 2, "pls": 9}]},
                {"id": 3, "bands": [{"id": 3, "pls": 5}]}
            ])
        );
    }

    #[test]
    fn update_replaces_scalar_lists_wholesale() {
        let updated = update(&json!({"c": ["US", "CA"]}), &json!({"c": ["NO"]}), &[]).unwrap();
        assert_eq!(updated, json!({"c": ["NO"]}));
    }

    #[test]
    fn update_never_adds_keys() {
        let updated = update(&json!({"a": 1}), &json!({"a": 2, "b": 3}), &[]).unwrap();
        assert_eq!(updated, json!({"a": 2}));
    }

    #[test]
    fn update_ignores_falsy_mapping_values() {
        let updated = update(&json!({"a": 1, "b": true}), &json!({"a": 0, "b": false}), &[]).unwrap();
        assert_eq!(updated, json!({"a": 1, "b": true}));
    }

    #[test]
    fn update_missing_predicate_field_errors() {
        let predicates = vec![Predicate::compile("missing == 1").unwrap()];
        let result = update(&json!([{"a": 1}]), &json!([{"a": 2}]), &predicates);
        assert!(matches!(result, Err(TreeError::Predicate(_))));
    }

    #[test]
    fn update_rejects_mismatched_shapes() {
        assert!(update(&json!({"a": [1]}), &json!({"a": {"b": 1}}), &[]).is_err());
        assert!(update(&json!({"a": {"b": 1}}), &json!({"a": [1]}), &[]).is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!({"a": null})));
    }
}
