//! YAML load and dump of channel documents

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chan_rules::AssetConfig;
use chan_tree::{kind_of, ChannelValue};

use crate::error::{StoreError, StoreResult};

/// Parse a YAML document; blank text is `null`
///
/// # Errors
/// [`StoreError::Yaml`] naming `origin` when the text does not parse.
pub fn parse(origin: &str, text: &str) -> StoreResult<ChannelValue> {
    if text.trim().is_empty() {
        return Ok(ChannelValue::Null);
    }
    serde_yaml::from_str(text).map_err(|source| StoreError::yaml(origin, source))
}

/// Parse a YAML mapping; blank text and `null` give an empty mapping
///
/// # Errors
/// [`StoreError::Yaml`] or [`StoreError::NotAMapping`].
pub fn parse_mapping(origin: &str, text: &str) -> StoreResult<AssetConfig> {
    into_mapping(origin, parse(origin, text)?)
}

/// Require a mapping, treating `null` as empty
///
/// # Errors
/// [`StoreError::NotAMapping`] for sequences and scalars.
pub fn into_mapping(origin: &str, value: ChannelValue) -> StoreResult<AssetConfig> {
    match value {
        ChannelValue::Null => Ok(AssetConfig::new()),
        ChannelValue::Object(map) => Ok(map),
        other => Err(StoreError::NotAMapping {
            origin: origin.to_string(),
            found: kind_of(&other),
        }),
    }
}

/// Read a YAML file, `None` if it does not exist
///
/// # Errors
/// IO errors other than not-found, and parse errors.
pub fn read(path: &Path) -> StoreResult<Option<ChannelValue>> {
    match fs::read_to_string(path) {
        Ok(text) => parse(&path.display().to_string(), &text).map(Some),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

/// Read a YAML mapping file; a missing or empty file is an empty mapping
///
/// # Errors
/// See [`read`] and [`into_mapping`].
pub fn read_mapping(path: &Path) -> StoreResult<AssetConfig> {
    let origin = path.display().to_string();
    into_mapping(&origin, read(path)?.unwrap_or(ChannelValue::Null))
}

/// Dump a value as a YAML document
///
/// # Errors
/// [`StoreError::Yaml`] if serialization fails.
pub fn dump(value: &ChannelValue) -> StoreResult<String> {
    serde_yaml::to_string(value).map_err(|source| StoreError::yaml("<dump>", source))
}

/// Dump a possibly absent channel record; absent is empty text
///
/// # Errors
/// See [`dump`].
pub fn dump_channel(record: Option<&ChannelValue>) -> StoreResult<String> {
    match record {
        None => Ok(String::new()),
        Some(value) => dump(value),
    }
}

/// Copy of `config` with top-level keys sorted
///
/// Nested mappings keep their order.
#[must_use]
pub fn normalized(config: &AssetConfig) -> AssetConfig {
    let mut keys: Vec<&String> = config.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| (key.clone(), config[key.as_str()].clone()))
        .collect()
}

/// Write a value as YAML, creating parent directories
///
/// # Errors
/// IO and serialization errors.
pub fn write(path: &Path, value: &ChannelValue) -> StoreResult<()> {
    let text = dump(value)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    fs::write(path, text).map_err(|err| StoreError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn blank_and_null_documents_are_empty_mappings() {
        assert!(parse_mapping("a.yaml", "").unwrap().is_empty());
        assert!(parse_mapping("a.yaml", "  \n").unwrap().is_empty());
        assert!(parse_mapping("a.yaml", "null\n").unwrap().is_empty());
    }

    #[test]
    fn sequences_are_not_mappings() {
        let err = parse_mapping("a.yaml", "- 1\n- 2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a YAML key-value mapping in a.yaml, found sequence"
        );
    }

    #[test]
    fn normalized_sorts_top_level_only() {
        let config = parse_mapping("a.yaml", "b: {z: 1, a: 2}\na: null\n").unwrap();
        let sorted = normalized(&config);
        let keys: Vec<&String> = sorted.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        let nested: Vec<&String> = sorted["b"].as_object().unwrap().keys().collect();
        assert_eq!(nested, vec!["z", "a"]);
    }

    #[test]
    fn dump_then_parse_preserves_value() {
        let value = json!({"enabled": true, "link_profile": [{"min_elevation_deg": 10}], "x": null});
        let text = dump(&value).unwrap();
        assert_eq!(parse("dump", &text).unwrap(), value);
        assert_eq!(dump_channel(None).unwrap(), "");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read(&dir.path().join("nope.yaml")).unwrap(), None);
        assert!(read_mapping(&dir.path().join("nope.yaml")).unwrap().is_empty());
    }
}
