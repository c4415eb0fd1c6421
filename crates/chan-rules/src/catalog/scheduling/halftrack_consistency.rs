//! Every S-band channel ships with a `_HALFTRACK` twin, and halftrack
//! channels carry an ADCS config suitable for pointing.

use chan_tree::{ChannelRecord, ChannelValue};

use crate::catalog::{nested, str_field};
use crate::input::{class_annos_of, AssetConfig, ValidationRuleInput};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.halftrack_consistency";

const HALFTRACK: &str = "HALFTRACK";
const HALFTRACK_ADCS_MODE: &str = "NADIRPOINTLATLON";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_for_sband_gs_templates",
        "Check that each SBAND channel has a HALFTRACK version with the correct adcs_pointing in gs templates",
        RuleCheck::GroundStationTemplateChannel(|input, channel, _, _| {
            halftrack_twin(&input.gs_templates, channel, true)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_for_sband_gs",
        "Check that each SBAND channel has a HALFTRACK version with the correct adcs_pointing in gs",
        RuleCheck::GroundStationChannel(|input, gs, channel, _, _| match input.gs_configs.get(gs) {
            Some(config) => halftrack_twin(config, channel, true),
            None => RuleOutcome::fail_with(format!("no config loaded for {gs}")),
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_for_sband_sat_templates",
        "Check that each SBAND channel has a HALFTRACK version in sat templates",
        RuleCheck::SatelliteTemplateChannel(|input, channel, _, _| {
            halftrack_twin(&input.sat_templates, channel, false)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_adcs_mode_gs_templates",
        "Check that for any HALFTRACK channel, the adcs_config must have mode NADIRPOINTLATLON in gs templates",
        RuleCheck::GroundStationTemplateChannel(|_, channel, annos, record| {
            halftrack_adcs_mode(channel, annos, record)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_adcs_mode_gs",
        "Check that for any HALFTRACK channel, the adcs_config must have mode NADIRPOINTLATLON in gs",
        RuleCheck::GroundStationChannel(|_, _, channel, annos, record| {
            halftrack_adcs_mode(channel, annos, record)
        }),
    ));
    // Satellite templates are exempt: ADCS configs are satellite specific.
    registry.register(Rule::new(
        MODULE,
        "check_halftrack_consistency_adcs_instrument_sat",
        "Check that for any HALFTRACK channel, the adcs_config must configure both instruments in sat",
        RuleCheck::SatelliteChannel(check_halftrack_consistency_adcs_instrument_sat),
    ));
}

/// `S_` channels need a `<id>_HALFTRACK` sibling in the same config;
/// optionally its annotations must say `adcs_pointing: HALFTRACK`
fn halftrack_twin(config: &AssetConfig, channel_id: &str, check_pointing: bool) -> RuleOutcome {
    if !channel_id.starts_with("S_") || channel_id.ends_with("_HALFTRACK") {
        return RuleOutcome::Pass;
    }
    let twin_id = format!("{channel_id}_{HALFTRACK}");
    let Some(twin) = config.get(&twin_id).and_then(ChannelValue::as_object) else {
        return RuleOutcome::fail_with(format!(
            "No SBAND HALFTRACK channel {twin_id} present. Every SBAND channel needs a HALFTRACK version."
        ));
    };
    if check_pointing && str_field(&class_annos_of(twin), "adcs_pointing") != Some(HALFTRACK) {
        return RuleOutcome::fail_with(format!(
            "SBAND HALFTRACK channel {twin_id} does not have the correct adcs_pointing classification annotation."
        ));
    }
    RuleOutcome::Pass
}

fn halftrack_adcs_mode(channel_id: &str, annos: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    if str_field(annos, "adcs_pointing") != Some(HALFTRACK) {
        return RuleOutcome::Pass;
    }
    match adcs_config(record) {
        None => RuleOutcome::fail_with(format!("HALFTRACK channel {channel_id} needs an adcs_config")),
        Some(config) if str_field(config, "mode") != Some(HALFTRACK_ADCS_MODE) => RuleOutcome::fail_with(
            format!("HALFTRACK channel {channel_id} should have adcs_config mode: {HALFTRACK_ADCS_MODE}"),
        ),
        Some(_) => RuleOutcome::Pass,
    }
}

fn check_halftrack_consistency_adcs_instrument_sat(
    _: &ValidationRuleInput,
    _: &str,
    channel_id: &str,
    annos: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    if str_field(annos, "adcs_pointing") != Some(HALFTRACK) {
        return RuleOutcome::Pass;
    }
    let Some(config) = adcs_config(record) else {
        return RuleOutcome::fail_with(format!("HALFTRACK channel {channel_id} needs an adcs_config"));
    };
    for (key, label) in [("primary_instrument", "primary"), ("secondary_instrument", "secondary")] {
        if !crate::catalog::truthy(config, key) {
            return RuleOutcome::fail_with(format!(
                "HALFTRACK channel {channel_id} should have adcs_config {label} instrument configured."
            ));
        }
    }
    RuleOutcome::Pass
}

/// Non-empty `window_parameters.adcs_config` mapping
fn adcs_config(record: &ChannelRecord) -> Option<&ChannelRecord> {
    nested(record, &["window_parameters", "adcs_config"])
        .and_then(ChannelValue::as_object)
        .filter(|config| !config.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    #[test]
    fn twin_must_exist_with_halftrack_pointing() {
        let config = record(json!({
            "S_TXO_A": {},
            "S_TXO_A_HALFTRACK": {"classification_annotations": {"adcs_pointing": "HALFTRACK"}},
            "S_TXO_B": {},
            "S_TXO_B_HALFTRACK": {"classification_annotations": {"adcs_pointing": "NADIR"}},
            "S_TXO_C": {},
            "X_TXO": {}
        }));
        assert!(halftrack_twin(&config, "S_TXO_A", true).is_pass());
        assert!(halftrack_twin(&config, "S_TXO_A_HALFTRACK", true).is_pass());
        assert!(halftrack_twin(&config, "X_TXO", true).is_pass());
        assert!(!halftrack_twin(&config, "S_TXO_B", true).is_pass());
        assert!(halftrack_twin(&config, "S_TXO_B", false).is_pass());
        assert_eq!(
            halftrack_twin(&config, "S_TXO_C", false).reason(),
            Some("No SBAND HALFTRACK channel S_TXO_C_HALFTRACK present. Every SBAND channel needs a HALFTRACK version.")
        );
    }

    #[test]
    fn halftrack_needs_pointing_adcs_mode() {
        let annos = record(json!({"adcs_pointing": "HALFTRACK"}));
        let good = record(json!({"window_parameters": {"adcs_config": {"mode": "NADIRPOINTLATLON"}}}));
        let wrong = record(json!({"window_parameters": {"adcs_config": {"mode": "NADIR"}}}));
        assert!(halftrack_adcs_mode("C", &annos, &good).is_pass());
        assert!(!halftrack_adcs_mode("C", &annos, &wrong).is_pass());
        assert_eq!(
            halftrack_adcs_mode("C", &annos, &ChannelRecord::new()).reason(),
            Some("HALFTRACK channel C needs an adcs_config")
        );
        assert!(halftrack_adcs_mode("C", &record(json!({"adcs_pointing": "NADIR"})), &wrong).is_pass());
    }

    #[test]
    fn satellite_halftrack_needs_instruments() {
        let input = ValidationRuleInput::default();
        let annos = record(json!({"adcs_pointing": "HALFTRACK"}));
        let full = record(json!({"window_parameters": {"adcs_config": {
            "primary_instrument": "SBAND_PATCH", "secondary_instrument": "GPS"
        }}}));
        let partial = record(json!({"window_parameters": {"adcs_config": {"primary_instrument": "SBAND_PATCH"}}}));
        assert!(check_halftrack_consistency_adcs_instrument_sat(&input, "FM1", "C", &annos, &full).is_pass());
        assert_eq!(
            check_halftrack_consistency_adcs_instrument_sat(&input, "FM1", "C", &annos, &partial).reason(),
            Some("HALFTRACK channel C should have adcs_config secondary instrument configured.")
        );
    }
}
