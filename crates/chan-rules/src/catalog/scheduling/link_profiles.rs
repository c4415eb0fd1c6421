//! Link profile count and elevation rules
//!
//! S/U bidirs carry a UHF link profile followed by an S-band one, and the UHF
//! minimum elevation may never exceed the S-band one, either by default or
//! for any satellite override. Every other class has exactly one profile.

use chan_tree::{ChannelRecord, ChannelValue};
use indexmap::IndexMap;

use crate::catalog::{mappings, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.link_profiles";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "check_link_profile_number_and_elevation_in_groundstation_templates",
        "Check link profile number and elevations in groundstation templates",
        RuleCheck::GroundStationTemplateChannel(|_, _, annos, record| {
            check_link_profile_number_and_elevation(annos, record)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_link_profile_number_and_elevation_in_groundstation_channels",
        "Check link profile number and elevations in groundstation channels",
        RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
            check_link_profile_number_and_elevation(annos, record)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_link_profile_elevation_overrides_unique",
        "Check link profile elevation overrides are unique",
        RuleCheck::GroundStationChannel(check_link_profile_elevation_overrides_unique),
    ));
}

fn check_link_profile_number_and_elevation(annos: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    let Some(profiles) = record.get("link_profile").and_then(ChannelValue::as_array) else {
        return RuleOutcome::fail_with("channel has no link_profile");
    };
    let count = profiles.len();

    if !(truthy(annos, "space_ground_sband") && truthy(annos, "ground_space_uhf")) {
        if count == 1 {
            return RuleOutcome::Pass;
        }
        return RuleOutcome::fail_with(format!(
            "Only 1 link profile expected for this class of contact but {count} were found"
        ));
    }

    if count != 2 {
        return RuleOutcome::fail_with(format!(
            "S/U bidirs expected to have precisely 2 link profiles (UHF, then S-band) but {count} were found"
        ));
    }
    let (Some(uhf), Some(sband)) = (profiles[0].as_object(), profiles[1].as_object()) else {
        return RuleOutcome::fail_with("link profiles must be mappings");
    };
    let Some(uhf_default) = default_min_elevation(uhf) else {
        return RuleOutcome::fail_with("UHF link profile has no default min elevation");
    };
    let Some(sband_default) = default_min_elevation(sband) else {
        return RuleOutcome::fail_with("S-band link profile has no default min elevation");
    };
    if sband_default < uhf_default {
        return RuleOutcome::fail_with(format!(
            "S-band default min elevation of {sband_default} should not be less than UHF default min elevation of {uhf_default}"
        ));
    }

    // satellite -> (UHF min elevation, S-band min elevation)
    let mut pairs: IndexMap<String, (f64, f64)> = IndexMap::new();
    for (sat, elevation) in satellite_min_elevations(uhf) {
        pairs.insert(sat, (elevation, sband_default));
    }
    for (sat, elevation) in satellite_min_elevations(sband) {
        pairs.entry(sat).or_insert((uhf_default, sband_default)).1 = elevation;
    }

    let invalid: Vec<&str> = pairs
        .iter()
        .filter(|(_, (uhf, sband))| uhf > sband)
        .map(|(sat, _)| sat.as_str())
        .collect();
    if invalid.is_empty() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "Effective min elevation greater for UHF than for S-band for these satellites: {}",
            crate::catalog::render_list(&invalid)
        ))
    }
}

/// `min_elevation_deg`, falling back to `default_min_elevation_deg` when
/// unset or zero
fn default_min_elevation(profile: &ChannelRecord) -> Option<f64> {
    profile
        .get("min_elevation_deg")
        .and_then(ChannelValue::as_f64)
        .filter(|elevation| *elevation != 0.0)
        .or_else(|| profile.get("default_min_elevation_deg").and_then(ChannelValue::as_f64))
}

fn satellite_min_elevations(profile: &ChannelRecord) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    for entry in mappings(profile.get("satellite_min_elevations")) {
        let Some(elevation) = entry.get("min_elevation_deg").and_then(ChannelValue::as_f64) else {
            continue;
        };
        for sat in entry
            .get("satellites")
            .and_then(ChannelValue::as_array)
            .into_iter()
            .flatten()
            .filter_map(ChannelValue::as_str)
        {
            out.push((sat.to_string(), elevation));
        }
    }
    out
}

fn check_link_profile_elevation_overrides_unique(
    _: &ValidationRuleInput,
    _: &str,
    _: &str,
    _: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    let profiles = mappings(record.get("link_profile"));
    if !profiles
        .first()
        .is_some_and(|first| first.contains_key("satellite_min_elevations"))
    {
        return RuleOutcome::Pass;
    }

    let overrides: Vec<f64> = profiles
        .iter()
        .flat_map(|profile| mappings(profile.get("satellite_min_elevations")))
        .filter_map(|entry| entry.get("min_elevation_deg").and_then(ChannelValue::as_f64))
        .collect();

    let mut duplicates: Vec<f64> = Vec::new();
    for (i, elevation) in overrides.iter().enumerate() {
        if overrides[..i].contains(elevation) && !duplicates.contains(elevation) {
            duplicates.push(*elevation);
        }
    }
    if duplicates.is_empty() {
        return RuleOutcome::Pass;
    }
    let rendered: Vec<String> = duplicates.iter().map(ToString::to_string).collect();
    RuleOutcome::fail_with(format!(
        "Elevation(s) {} were mentioned multiple times in the link profile",
        crate::catalog::render_list(&rendered)
    ))
}
