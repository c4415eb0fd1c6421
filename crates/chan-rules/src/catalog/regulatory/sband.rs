//! Elevation-restricted variants (`<parent>...DEG`) of the parameterised
//! S-band contacts must be licensed and enabled exactly like their parent.

use std::collections::BTreeSet;

use chan_tree::{ChannelRecord, ChannelValue};
use regex::Regex;

use crate::input::{AssetConfig, ValidationRuleInput};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "regulatory.sband";

const PARENT_CHANNELS: [&str; 2] = ["CONTACT_BIDIR_PARAM_DVBS2X", "CONTACT_RXO_DVBS2X"];

const DESCRIPTION: &str = "Variants of CONTACT_BIDIR_PARAM_DVBS2X and CONTACT_RXO_DVBS2X must have the same allowed_license_countries and be disabled if the parent is disabled";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "gs_variants_of_contact_bidir_param_dvbs2x_and_contact_rxo_dvbs2x_must_have_the_same_allowed_license_countries",
        DESCRIPTION,
        RuleCheck::GroundStationChannel(|input, gs, channel, _, _| {
            input
                .gs_configs
                .get(gs)
                .map_or(RuleOutcome::Pass, |config| variants_match_parent(config, channel))
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "sat_variants_of_contact_bidir_param_dvbs2x_and_contact_rxo_dvbs2x_must_have_the_same_allowed_license_countries",
        DESCRIPTION,
        RuleCheck::SatelliteChannel(|input, sat, channel, _, _| {
            input
                .sat_configs
                .get(sat)
                .map_or(RuleOutcome::Pass, |config| variants_match_parent(config, channel))
        }),
    ));
}

fn variants_match_parent(config: &AssetConfig, parent: &str) -> RuleOutcome {
    if !PARENT_CHANNELS.contains(&parent) {
        return RuleOutcome::Pass;
    }
    let pattern = match Regex::new(&format!("^{}.*DEG$", regex::escape(parent))) {
        Ok(pattern) => pattern,
        Err(err) => return RuleOutcome::fail_with(err.to_string()),
    };

    let parent_record = config.get(parent).and_then(ChannelValue::as_object);
    let mismatched: Vec<&str> = config
        .keys()
        .filter(|id| pattern.is_match(id))
        .filter(|id| {
            let variant = config.get(id.as_str()).and_then(ChannelValue::as_object);
            !same_licensing(parent_record, variant)
        })
        .map(String::as_str)
        .collect();

    if mismatched.is_empty() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "variants {} differ from {parent}",
            crate::catalog::render_list(&mismatched)
        ))
    }
}

fn same_licensing(parent: Option<&ChannelRecord>, variant: Option<&ChannelRecord>) -> bool {
    countries(parent) == countries(variant) && enabled(parent) == enabled(variant)
}

fn countries(record: Option<&ChannelRecord>) -> BTreeSet<&str> {
    record
        .and_then(|r| r.get("allowed_license_countries"))
        .and_then(ChannelValue::as_array)
        .map(|items| items.iter().filter_map(ChannelValue::as_str).collect())
        .unwrap_or_default()
}

fn enabled(record: Option<&ChannelRecord>) -> Option<&ChannelValue> {
    record.and_then(|r| r.get("enabled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    #[test]
    fn variants_follow_parent() {
        let config = record(json!({
            "CONTACT_RXO_DVBS2X": {"enabled": true, "allowed_license_countries": ["US", "AU"]},
            "CONTACT_RXO_DVBS2X_20DEG": {"enabled": true, "allowed_license_countries": ["AU", "US"]},
            "CONTACT_RXO_DVBS2X_30DEG": {"enabled": false, "allowed_license_countries": ["AU", "US"]},
            "CONTACT_RXO_DVBS2X_NARROW": {"enabled": false}
        }));
        assert_eq!(
            variants_match_parent(&config, "CONTACT_RXO_DVBS2X").reason(),
            Some("variants [CONTACT_RXO_DVBS2X_30DEG] differ from CONTACT_RXO_DVBS2X")
        );
        assert!(variants_match_parent(&config, "CONTACT_RXO_DVBS2X_20DEG").is_pass());
    }

    #[test]
    fn consistent_variants_pass() {
        let config = record(json!({
            "CONTACT_BIDIR_PARAM_DVBS2X": {"enabled": false, "allowed_license_countries": []},
            "CONTACT_BIDIR_PARAM_DVBS2X_45DEG": {"enabled": false, "allowed_license_countries": []}
        }));
        assert!(variants_match_parent(&config, "CONTACT_BIDIR_PARAM_DVBS2X").is_pass());
    }
}
