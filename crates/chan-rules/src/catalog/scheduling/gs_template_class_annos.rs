//! Consistency of classification annotations in the GS templates

use chan_tree::ChannelRecord;

use crate::catalog::{str_field, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.gs_template_class_annos";

pub(super) fn register(registry: &mut RuleRegistry) {
    let rules: [(&str, &str, crate::rule::TemplateChannelCheck); 8] = [
        (
            "space_ground_sband_dvbs2x_must_have_pls_value",
            "DVBS2X-encoded space-ground SBand must have classification annotation space_ground_sband_dvbs2x_pls",
            space_ground_sband_dvbs2x_must_have_pls_value,
        ),
        (
            "space_ground_sband_must_have_bandwidth",
            "Space-ground SBand must have classification annotation space_ground_sband_bandwidth_mhz",
            space_ground_sband_must_have_bandwidth,
        ),
        (
            "space_ground_sband_must_have_encoding",
            "Space-ground SBand must have classification annotation space_ground_sband_encoding",
            space_ground_sband_must_have_encoding,
        ),
        (
            "space_ground_sband_must_have_mid_freq",
            "Space-ground SBand must have classification annotation space_ground_sband_mid_freq_mhz",
            space_ground_sband_must_have_mid_freq,
        ),
        (
            "space_ground_xband_must_have_pls_value",
            "Space-ground XBand must have classification annotation space_ground_xband_dvbs2x_pls",
            space_ground_xband_must_have_pls_value,
        ),
        (
            "space_ground_xband_must_have_bandwidth",
            "Space-ground XBand must have classification annotation space_ground_xband_bandwidth_mhz",
            space_ground_xband_must_have_bandwidth,
        ),
        (
            "directionality_must_match_radio_band_booleans",
            "Directionality classification annotation must be correct given the individual radio band booleans",
            directionality_must_match_radio_band_booleans,
        ),
        (
            "s_band_annotations_on_ground_space_sband_contacts",
            "Check S-band annotations present on ground space S-band contacts",
            s_band_annotations_on_ground_space_sband_contacts,
        ),
    ];
    for (name, description, check) in rules {
        registry.register(Rule::new(
            MODULE,
            name,
            description,
            RuleCheck::GroundStationTemplateChannel(check),
        ));
    }
}

/// Fails when `flag` is set but `required` is missing or falsy
fn requires(annos: &ChannelRecord, flag: &str, required: &str) -> RuleOutcome {
    (!truthy(annos, flag) || truthy(annos, required)).into()
}

fn space_ground_sband_dvbs2x_must_have_pls_value(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    if str_field(annos, "space_ground_sband_encoding") != Some("DVBS2X") {
        return RuleOutcome::Pass;
    }
    requires(annos, "space_ground_sband", "space_ground_sband_dvbs2x_pls")
}

fn space_ground_sband_must_have_bandwidth(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    requires(annos, "space_ground_sband", "space_ground_sband_bandwidth_mhz")
}

fn space_ground_sband_must_have_encoding(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    requires(annos, "space_ground_sband", "space_ground_sband_encoding")
}

fn space_ground_sband_must_have_mid_freq(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    requires(annos, "space_ground_sband", "space_ground_sband_mid_freq_mhz")
}

fn space_ground_xband_must_have_pls_value(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    requires(annos, "space_ground_xband", "space_ground_xband_dvbs2x_pls")
}

fn space_ground_xband_must_have_bandwidth(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    requires(annos, "space_ground_xband", "space_ground_xband_bandwidth_mhz")
}

fn directionality_must_match_radio_band_booleans(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    let any_down = ["space_ground_xband", "space_ground_sband", "space_ground_uhf"]
        .iter()
        .any(|key| truthy(annos, key));
    let any_up = ["ground_space_sband", "ground_space_uhf"]
        .iter()
        .any(|key| truthy(annos, key));

    let expected = match (any_down, any_up) {
        (true, true) => "BIDIR",
        (true, false) => "TXO",
        (false, true) => "RXO",
        (false, false) => {
            return RuleOutcome::fail_with(
                "no radio band booleans are true, no directionality is applicable",
            )
        }
    };

    match str_field(annos, "directionality") {
        Some(actual) if actual == expected => RuleOutcome::Pass,
        actual => RuleOutcome::fail_with(format!(
            "directionality is {} but radio band booleans imply {expected}",
            actual.unwrap_or("null")
        )),
    }
}

fn s_band_annotations_on_ground_space_sband_contacts(
    _: &ValidationRuleInput,
    _: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    if !truthy(annos, "ground_space_sband") {
        return RuleOutcome::Pass;
    }
    let missing: Vec<&str> = ["ground_space_sband_encoding"]
        .into_iter()
        .filter(|key| !annos.contains_key(*key))
        .collect();
    if missing.is_empty() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "Missing required fields on ground -> space s-band contact: {}",
            crate::catalog::render_list(&missing)
        ))
    }
}
