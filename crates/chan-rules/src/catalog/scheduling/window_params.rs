//! Forward/reverse channel layout of S/U bidirs across every asset

use std::collections::{BTreeSet, HashSet};

use chan_tree::{ChannelRecord, ChannelValue};

use crate::catalog::{mappings, str_field, truthy};
use crate::input::{class_annos_of, configured_channels, ValidationRuleInput};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.window_params";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "uhf_must_be_first_window_param_in_s_u_bidir",
        "S/U bidir forward channels must list UHF first and S-band second",
        RuleCheck::General(uhf_must_be_first_window_param_in_s_u_bidir),
    ));
    registry.register(Rule::new(
        MODULE,
        "s_u_bidir_must_have_correct_number_of_channels",
        "S/U bidirs must have two forward channels and one reverse channel",
        RuleCheck::General(s_u_bidir_must_have_correct_number_of_channels),
    ));
}

/// Every configured S/U bidir channel with window parameters, labelled
/// `<channel> on <asset>`
fn s_u_bidir_window_params(input: &ValidationRuleInput) -> Vec<(String, &ChannelRecord)> {
    let bidirs: HashSet<&str> = configured_channels(&input.gs_templates)
        .filter(|(_, record)| {
            let annos = class_annos_of(record);
            str_field(&annos, "directionality") == Some("BIDIR") && truthy(&annos, "space_ground_sband")
        })
        .map(|(id, _)| id.as_str())
        .collect();

    input
        .gs_configs
        .iter()
        .chain(input.sat_configs.iter())
        .flat_map(|(asset, config)| {
            configured_channels(config).map(move |(channel, record)| (asset, channel, record))
        })
        .filter(|(_, channel, _)| bidirs.contains(channel.as_str()))
        .filter_map(|(asset, channel, record)| {
            record
                .get("window_parameters")
                .filter(|params| chan_tree::is_truthy(params))
                .and_then(ChannelValue::as_object)
                .map(|params| (format!("{channel} on {asset}"), params))
        })
        .collect()
}

fn uhf_must_be_first_window_param_in_s_u_bidir(input: &ValidationRuleInput) -> RuleOutcome {
    let errors: BTreeSet<String> = s_u_bidir_window_params(input)
        .into_iter()
        .filter(|(_, params)| {
            let bands: Vec<Option<&str>> = mappings(params.get("forward_channels"))
                .into_iter()
                .map(|channel| str_field(channel, "radio_band"))
                .collect();
            bands.first().copied().flatten() != Some("UHF") || bands.get(1).copied().flatten() != Some("SBAND")
        })
        .map(|(label, _)| label)
        .collect();
    failures("Following channels have incorrect UHF/SBAND forward channel order", &errors)
}

fn s_u_bidir_must_have_correct_number_of_channels(input: &ValidationRuleInput) -> RuleOutcome {
    let errors: BTreeSet<String> = s_u_bidir_window_params(input)
        .into_iter()
        .filter(|(_, params)| {
            mappings(params.get("forward_channels")).len() != 2
                || mappings(params.get("reverse_channels")).len() != 1
        })
        .map(|(label, _)| label)
        .collect();
    failures(
        "Following channels do not have the correct number of forward/reverse channels",
        &errors,
    )
}

fn failures(header: &str, errors: &BTreeSet<String>) -> RuleOutcome {
    if errors.is_empty() {
        return RuleOutcome::Pass;
    }
    let listed: Vec<&str> = errors.iter().map(String::as_str).collect();
    RuleOutcome::fail_with(format!("{header}: {}", listed.join(", ")))
}
