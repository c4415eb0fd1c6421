//! Snapshot of everything a validation run looks at

use chan_tree::{ChannelRecord, ChannelValue};
use indexmap::IndexMap;

use crate::environment::Environment;

/// Channel id to record for one asset or template file.
///
/// A `null` entry means the channel is listed but not configured.
pub type AssetConfig = serde_json::Map<String, ChannelValue>;

/// Channel id to classification annotations
pub type ClassAnnotationMap = IndexMap<String, ChannelRecord>;

/// Immutable input shared by every rule invocation of one run
#[derive(Debug, Clone, Default)]
pub struct ValidationRuleInput {
    /// Environment being validated
    pub environment: Environment,
    /// Satellite template channels
    pub sat_templates: AssetConfig,
    /// Ground station template channels, the source of classification annotations
    pub gs_templates: AssetConfig,
    /// Satellite id to its config
    pub sat_configs: IndexMap<String, AssetConfig>,
    /// Ground station id to its config
    pub gs_configs: IndexMap<String, AssetConfig>,
    /// Shared separation constraint set name to its constraint list
    pub shared_constraint_sets: IndexMap<String, ChannelValue>,
}

impl ValidationRuleInput {
    /// Empty input for an environment
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Classification annotations of a channel, taken from the GS templates.
    ///
    /// Empty when the channel or its annotations are missing.
    #[must_use]
    pub fn class_annos(&self, channel_id: &str) -> ChannelRecord {
        self.gs_templates
            .get(channel_id)
            .and_then(ChannelValue::as_object)
            .map(class_annos_of)
            .unwrap_or_default()
    }

    /// Classification annotations of every GS template channel
    #[must_use]
    pub fn class_annos_map(&self) -> ClassAnnotationMap {
        configured_channels(&self.gs_templates)
            .map(|(id, record)| (id.clone(), class_annos_of(record)))
            .collect()
    }
}

/// Iterate the configured (non-null mapping) channels of a config
pub fn configured_channels(
    config: &AssetConfig,
) -> impl Iterator<Item = (&String, &ChannelRecord)> {
    config
        .iter()
        .filter_map(|(id, value)| value.as_object().map(|record| (id, record)))
}

/// The `classification_annotations` mapping of a record, or an empty one
#[must_use]
pub fn class_annos_of(record: &ChannelRecord) -> ChannelRecord {
    record
        .get("classification_annotations")
        .and_then(ChannelValue::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chan_test_utils::{gs_templates, uhf_class_annos, UHF_CHANNEL};
    use serde_json::json;

    fn input() -> ValidationRuleInput {
        let mut input = ValidationRuleInput::new(Environment::Staging);
        input.gs_templates = gs_templates().as_object().unwrap().clone();
        input
    }

    #[test]
    fn class_annos_from_gs_templates() {
        let annos = input().class_annos(UHF_CHANNEL);
        assert_eq!(json!(annos), uhf_class_annos());
    }

    #[test]
    fn class_annos_missing_channel_is_empty() {
        assert!(input().class_annos("NOPE").is_empty());
    }

    #[test]
    fn configured_channels_skip_nulls() {
        let config: AssetConfig = json!({"A": {"enabled": true}, "B": null})
            .as_object()
            .unwrap()
            .clone();
        let ids: Vec<&String> = configured_channels(&config).map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["A"]);
    }
}
