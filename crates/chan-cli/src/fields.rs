//! Channel field edits requested on the command line
//!
//! Each editing flag yields one requested field value. [`modify`] combines
//! those values with an existing record according to the [`EditMode`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chan_store::{split_list, yaml};
use chan_tree::{merge, remove, update, ChannelRecord, ChannelValue, Predicate};

use crate::error::{CommandError, CommandResult};

/// How requested values combine with the existing record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Replace each field wholesale
    #[default]
    Overwrite,
    /// Deep-merge into each field
    Merge,
    /// Subtract from the record, collapsing empties
    Remove,
    /// Replace existing leaves only, optionally scoped by predicates
    Update,
}

impl EditMode {
    /// Flag spellings, in help order
    pub const NAMES: [&'static str; 4] = ["overwrite", "merge", "remove", "update"];
}

impl FromStr for EditMode {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            "remove" => Ok(Self::Remove),
            "update" => Ok(Self::Update),
            other => Err(CommandError::invalid("mode", format!("unknown mode '{other}'"))),
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::Remove => "remove",
            Self::Update => "update",
        })
    }
}

/// Shape a YAML-valued flag must parse to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YamlShape {
    /// Key-value mapping
    Mapping,
    /// List
    Sequence,
    /// Either
    Collection,
}

impl YamlShape {
    fn accepts(self, value: &ChannelValue) -> bool {
        match self {
            Self::Mapping => value.is_object(),
            Self::Sequence => value.is_array(),
            Self::Collection => value.is_object() || value.is_array(),
        }
    }

    fn expectation(self) -> &'static str {
        match self {
            Self::Mapping => "Expected YAML key-value mapping",
            Self::Sequence => "Expected YAML array",
            Self::Collection => "Expected YAML collection (map or list)",
        }
    }
}

/// Fields taking a YAML value, each with a `--<field>-file` variant
pub const YAML_FIELDS: [(&str, YamlShape); 6] = [
    ("ground_station_constraints", YamlShape::Collection),
    ("satellite_constraints", YamlShape::Collection),
    ("link_profile", YamlShape::Sequence),
    ("window_parameters", YamlShape::Mapping),
    ("dynamic_window_parameters", YamlShape::Mapping),
    ("classification_annotations", YamlShape::Mapping),
];

/// Allowed `--directionality` values
pub const DIRECTIONALITIES: [&str; 3] = ["Bidirectional", "SpaceToEarth", "EarthToSpace"];

/// Parse a yes/no flag value
///
/// # Errors
/// A message naming the unrecognized input.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(format!("Unrecognized input '{value}'")),
    }
}

/// Parse YAML flag text into the required shape
///
/// # Errors
/// [`CommandError::InvalidValue`] for bad YAML or the wrong shape.
pub fn parse_yaml_value(flag: &str, text: &str, shape: YamlShape) -> CommandResult<ChannelValue> {
    let value = yaml::parse(&format!("--{flag}"), text).map_err(|e| CommandError::invalid(flag, e.to_string()))?;
    if shape.accepts(&value) {
        Ok(value)
    } else {
        Err(CommandError::invalid(flag, shape.expectation()))
    }
}

/// Read a YAML flag value from a file
///
/// # Errors
/// Read failures, and see [`parse_yaml_value`].
pub fn read_yaml_value(flag: &str, path: &Path, shape: YamlShape) -> CommandResult<ChannelValue> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CommandError::invalid(flag, format!("cannot read {}: {e}", path.display())))?;
    parse_yaml_value(flag, &text, shape)
}

/// Requested field values plus how to apply them
#[derive(Debug, Clone, Default)]
pub struct FieldEdits {
    /// How values combine with the existing record
    pub mode: EditMode,
    /// Element filters for `update` mode
    pub predicates: Vec<Predicate>,
    values: ChannelRecord,
}

impl FieldEdits {
    /// No requested values yet
    #[must_use]
    pub fn new(mode: EditMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Scope `update` mode to list elements matching every predicate
    ///
    /// # Errors
    /// [`CommandError::PredicateWithoutUpdate`] outside `update` mode.
    pub fn with_predicates(mut self, predicates: Vec<Predicate>) -> CommandResult<Self> {
        if !predicates.is_empty() && self.mode != EditMode::Update {
            return Err(CommandError::PredicateWithoutUpdate);
        }
        self.predicates = predicates;
        Ok(self)
    }

    /// Request a field value
    #[must_use]
    pub fn with(mut self, field: &str, value: ChannelValue) -> Self {
        self.set(field, value);
        self
    }

    /// Request a field value in place
    pub fn set(&mut self, field: &str, value: ChannelValue) {
        self.values.insert(field.to_string(), value);
    }

    /// Requested values, in flag order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &ChannelRecord {
        &self.values
    }
}

/// Apply requested edits to a record
///
/// Returns `None` when `remove` collapses the whole record.
///
/// # Errors
/// Algebra shape mismatches and predicate failures.
pub fn modify(record: &ChannelRecord, edits: &FieldEdits) -> CommandResult<Option<ChannelRecord>> {
    let mut result = record.clone();
    match edits.mode {
        EditMode::Overwrite => {
            for (field, value) in edits.values() {
                result.insert(field.clone(), value.clone());
            }
        }
        EditMode::Merge => {
            for (field, value) in edits.values() {
                let merged = match record.get(field) {
                    Some(existing) if !existing.is_null() => merge(existing, value)?,
                    _ => value.clone(),
                };
                result.insert(field.clone(), merged);
            }
        }
        EditMode::Remove => {
            let current = ChannelValue::Object(result);
            let requested = ChannelValue::Object(edits.values().clone());
            return Ok(match remove(&current, &requested)? {
                Some(ChannelValue::Object(rest)) if !rest.is_empty() => Some(rest),
                _ => None,
            });
        }
        EditMode::Update => {
            for (field, value) in edits.values() {
                if let Some(existing) = record.get(field) {
                    result.insert(field.clone(), update(existing, value, &edits.predicates)?);
                }
            }
        }
    }
    Ok(Some(result))
}
