//! Dot-separated path access into channel trees
//!
//! `window_parameters.forward_channels.0.radio_band` walks mapping keys and,
//! for sequences, numeric indices.

use serde_json::{Map, Value};

use crate::error::TreeError;

/// Look up a nested value by dot-separated path.
///
/// Returns `None` when any segment is missing.
#[must_use]
pub fn lookup<'a>(path: &str, value: &'a Value) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(fields) => fields.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Set a nested value by dot-separated path, creating intermediate mappings.
///
/// # Errors
/// Returns [`TreeError::ShapeMismatch`] when an intermediate segment holds
/// something other than a mapping.
pub fn set_path(path: &str, target: &mut Value, new_value: Value) -> Result<(), TreeError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return Ok(());
    };

    let mut current = target;
    for segment in segments {
        let fields = as_mapping(current)?;
        current = fields
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    as_mapping(current)?.insert(last.to_string(), new_value);
    Ok(())
}

fn as_mapping(value: &mut Value) -> Result<&mut Map<String, Value>, TreeError> {
    let kind = crate::kind_of(value);
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(TreeError::ShapeMismatch {
            operation: "set_path",
            left: kind,
            right: "mapping",
        }),
    }
}
