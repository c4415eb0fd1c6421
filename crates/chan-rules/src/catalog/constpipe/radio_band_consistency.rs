//! Radio bands of forward/reverse channels must agree with the annotations
//! and appear in a fixed order, since downstream merging pairs ground and
//! satellite channels by position.
//!
//! Only S/U bidirs are checked.

use chan_tree::{is_truthy, ChannelRecord};

use crate::catalog::{mappings, render_list, str_field, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "constpipe.radio_band_consistency";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "groundstation_channel_radio_bands_consistent_with_class_annos",
        "Groundstation channel: radio bands are consistent with classification annotations",
        RuleCheck::GroundStationChannel(|_, _, _, annos, record| check_consistent_radio_bands(annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "satellite_channel_radio_bands_consistent_with_class_annos",
        "Satellite channel: radio bands are consistent with classification annotations",
        RuleCheck::SatelliteChannel(|_, _, _, annos, record| check_consistent_radio_bands(annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "groundstation_template_channel_radio_bands_consistent_with_class_annos",
        "Groundstation template channel: radio bands are consistent with classification annotations",
        RuleCheck::GroundStationTemplateChannel(|_, _, annos, record| check_consistent_radio_bands(annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "satellite_template_channel_radio_bands_consistent_with_class_annos",
        "Satellite template channel: radio bands are consistent with classification annotations",
        RuleCheck::SatelliteTemplateChannel(|_, _, annos, record| check_consistent_radio_bands(annos, record)),
    ));
}

/// Bands whose flag is set, in descending name order (`[UHF, SBAND]`)
fn expected_bands(annos: &ChannelRecord, flags: &[(&str, &'static str)]) -> Vec<&'static str> {
    let mut bands: Vec<&'static str> = flags
        .iter()
        .filter(|(flag, _)| truthy(annos, flag))
        .map(|(_, band)| *band)
        .collect();
    bands.sort_unstable_by(|a, b| b.cmp(a));
    bands
}

fn channel_bands<'a>(window_parameters: &'a ChannelRecord, key: &str) -> Vec<&'a str> {
    mappings(window_parameters.get(key))
        .into_iter()
        .filter_map(|channel| str_field(channel, "radio_band"))
        .filter(|band| !band.is_empty())
        .collect()
}

fn check_consistent_radio_bands(annos: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    let is_s_u_bidir = ["space_ground_uhf", "space_ground_sband", "ground_space_uhf"]
        .iter()
        .all(|key| truthy(annos, key));
    if !is_s_u_bidir {
        return RuleOutcome::Pass;
    }

    let expected_forward = expected_bands(
        annos,
        &[
            ("space_ground_uhf", "UHF"),
            ("space_ground_sband", "SBAND"),
            ("space_ground_xband", "XBAND"),
        ],
    );
    let expected_reverse = expected_bands(annos, &[("ground_space_uhf", "UHF"), ("ground_space_sband", "SBAND")]);

    // Missing window parameters are tolerated.
    let Some(window_parameters) = record
        .get("window_parameters")
        .filter(|params| is_truthy(params))
        .and_then(|params| params.as_object())
    else {
        return RuleOutcome::Pass;
    };

    if channel_bands(window_parameters, "forward_channels") == expected_forward
        && channel_bands(window_parameters, "reverse_channels") == expected_reverse
    {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "Expected ordered forward/reverse channel radio bands {}/{}",
            render_list(&expected_forward),
            render_list(&expected_reverse)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    fn s_u() -> ChannelRecord {
        record(json!({"space_ground_uhf": true, "ground_space_uhf": true, "space_ground_sband": true}))
    }

    #[test]
    fn uhf_precedes_sband() {
        let ordered = record(json!({"window_parameters": {
            "forward_channels": [{"radio_band": "UHF"}, {"radio_band": "SBAND"}],
            "reverse_channels": [{"radio_band": "UHF"}]
        }}));
        assert!(check_consistent_radio_bands(&s_u(), &ordered).is_pass());

        let swapped = record(json!({"window_parameters": {
            "forward_channels": [{"radio_band": "SBAND"}, {"radio_band": "UHF"}],
            "reverse_channels": [{"radio_band": "UHF"}]
        }}));
        assert_eq!(
            check_consistent_radio_bands(&s_u(), &swapped).reason(),
            Some("Expected ordered forward/reverse channel radio bands [UHF, SBAND]/[UHF]")
        );
    }

    #[test]
    fn unlabelled_channels_are_ignored_and_missing_params_pass() {
        let unlabelled = record(json!({"window_parameters": {
            "forward_channels": [{"radio_band": "UHF"}, {}, {"radio_band": "SBAND"}],
            "reverse_channels": [{"radio_band": "UHF"}]
        }}));
        assert!(check_consistent_radio_bands(&s_u(), &unlabelled).is_pass());
        assert!(check_consistent_radio_bands(&s_u(), &ChannelRecord::new()).is_pass());
    }

    #[test]
    fn other_classes_pass() {
        let annos = record(json!({"space_ground_xband": true}));
        let params = record(json!({"window_parameters": {"forward_channels": [{"radio_band": "UHF"}]}}));
        assert!(check_consistent_radio_bands(&annos, &params).is_pass());
    }
}
