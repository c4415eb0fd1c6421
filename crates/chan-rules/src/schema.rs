//! JSON-Schema (draft 7) checks of channel records
//!
//! `schema.yaml` holds three schemas: `gs_schema` and `sat_schema` apply to
//! each channel record of an asset config, and
//! `shared_separation_constraint_sets_schema` applies to a whole shared set
//! document.

use std::collections::BTreeSet;
use std::fmt;

use chan_tree::{ChannelRecord, ChannelValue};
use jsonschema::{Draft, Validator};

use crate::environment::AssetKind;
use crate::error::SchemaValidationError;
use crate::input::{configured_channels, AssetConfig};

/// Key of the ground station channel schema in `schema.yaml`
pub const GS_SCHEMA_KEY: &str = "gs_schema";
/// Key of the satellite channel schema in `schema.yaml`
pub const SAT_SCHEMA_KEY: &str = "sat_schema";
/// Key of the shared separation constraint set schema in `schema.yaml`
pub const SHARED_SETS_SCHEMA_KEY: &str = "shared_separation_constraint_sets_schema";

/// A compiled schema
pub struct SchemaValidator {
    key: String,
    schema: ChannelValue,
    validator: Validator,
}

impl SchemaValidator {
    /// Compile `schema` under draft 7
    ///
    /// # Errors
    /// Returns [`SchemaValidationError::InvalidSchema`] if the schema does
    /// not compile.
    pub fn compile(key: impl Into<String>, schema: ChannelValue) -> Result<Self, SchemaValidationError> {
        let key = key.into();
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .map_err(|err| SchemaValidationError::InvalidSchema {
                key: key.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { key, schema, validator })
    }

    /// Key of this schema in `schema.yaml`
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw schema document
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ChannelValue {
        &self.schema
    }

    /// Validate one document
    ///
    /// The reported error is the shallowest one: fewest instance path
    /// segments, first in iteration order on ties.
    ///
    /// # Errors
    /// Returns [`SchemaValidationError::Invalid`] carrying the best match
    /// and the total error count.
    pub fn validate(&self, location: &str, instance: &ChannelValue) -> Result<(), SchemaValidationError> {
        let errors: Vec<(usize, String)> = self
            .validator
            .iter_errors(instance)
            .map(|e| (path_depth(e.instance_path().as_str()), e.to_string()))
            .collect();
        match errors.iter().min_by_key(|(depth, _)| *depth) {
            None => Ok(()),
            Some((_, best)) => Err(SchemaValidationError::Invalid {
                location: location.to_string(),
                message: best.clone(),
                count: errors.len(),
            }),
        }
    }

    /// Validate every configured channel record of an asset config.
    ///
    /// Unconfigured (`null`) channels are skipped.
    ///
    /// # Errors
    /// The first failing record's error, located as `<file>: <channel>`.
    pub fn validate_channels(&self, file: &str, config: &AssetConfig) -> Result<(), SchemaValidationError> {
        for (channel, record) in configured_channels(config) {
            self.validate_record(&format!("{file}: {channel}"), record)?;
        }
        Ok(())
    }

    /// Validate a single channel record
    ///
    /// # Errors
    /// See [`SchemaValidator::validate`].
    pub fn validate_record(&self, location: &str, record: &ChannelRecord) -> Result<(), SchemaValidationError> {
        self.validate(location, &ChannelValue::Object(record.clone()))
    }

    /// Top-level property names declared by the schema
    #[must_use]
    pub fn properties(&self) -> BTreeSet<&str> {
        self.schema
            .get("properties")
            .and_then(ChannelValue::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Keep only the record keys the schema declares, in record order
    #[must_use]
    pub fn filter_properties(&self, record: &ChannelRecord) -> ChannelRecord {
        let allowed = self.properties();
        record
            .iter()
            .filter(|(key, _)| allowed.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("key", &self.key)
            .field("properties", &self.properties())
            .finish_non_exhaustive()
    }
}

/// The three schemas of `schema.yaml`
#[derive(Debug)]
pub struct SchemaSet {
    ground_station: SchemaValidator,
    satellite: SchemaValidator,
    shared_sets: SchemaValidator,
}

impl SchemaSet {
    /// Compile the schemas of a parsed `schema.yaml`
    ///
    /// # Errors
    /// [`SchemaValidationError::InvalidSchema`] when a key is missing or a
    /// schema does not compile.
    pub fn from_document(document: &ChannelValue) -> Result<Self, SchemaValidationError> {
        let take = |key: &str| {
            let schema = document.get(key).cloned().ok_or_else(|| SchemaValidationError::InvalidSchema {
                key: key.to_string(),
                message: "missing from schema document".to_string(),
            })?;
            SchemaValidator::compile(key, schema)
        };
        Ok(Self {
            ground_station: take(GS_SCHEMA_KEY)?,
            satellite: take(SAT_SCHEMA_KEY)?,
            shared_sets: take(SHARED_SETS_SCHEMA_KEY)?,
        })
    }

    /// Channel schema for an asset kind
    #[must_use]
    pub fn for_kind(&self, kind: AssetKind) -> &SchemaValidator {
        match kind {
            AssetKind::GroundStation => &self.ground_station,
            AssetKind::Satellite => &self.satellite,
        }
    }

    /// Shared separation constraint set schema
    #[inline]
    #[must_use]
    pub fn shared_sets(&self) -> &SchemaValidator {
        &self.shared_sets
    }
}

fn path_depth(pointer: &str) -> usize {
    pointer.matches('/').count()
}
