use chan_tree::{ChannelRecord, ChannelValue};
use serde_json::json;

use crate::catalog::str_field;
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "constpipe.otc_p1_lsc_consistency";

const OTC_P1_SATELLITES: [&str; 8] = ["FM211", "FM212", "FM213", "FM214", "FM215", "FM216", "FM217", "FM218"];

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "satellite_channel_otc_p1_has_lsc",
        "OTC-P1 TXO channels have dedicated time for Oort topic otc_prio_0",
        RuleCheck::SatelliteChannel(satellite_channel_otc_p1_has_lsc),
    ));
}

fn expected_link_state_cues() -> ChannelValue {
    json!([
        {"topics": ["otc_prio_0"], "offset": 0},
        {"topics": ["*"], "offset": 30},
        {"topics": ["otc_prio_0"], "offset": 60},
        {"topics": ["*"], "offset": 90}
    ])
}

fn satellite_channel_otc_p1_has_lsc(
    _: &ValidationRuleInput,
    sat_id: &str,
    _: &str,
    annos: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    if !OTC_P1_SATELLITES.contains(&sat_id) || str_field(annos, "directionality") != Some("TXO") {
        return RuleOutcome::Pass;
    }
    let Some(window_parameters) = record.get("window_parameters").and_then(ChannelValue::as_object) else {
        return RuleOutcome::fail_with("Element missing: window_parameters");
    };
    let Some(cues) = window_parameters.get("link_state_cues") else {
        return RuleOutcome::fail_with("Element missing: link_state_cues");
    };

    let expected = expected_link_state_cues();
    if *cues == expected {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "Expected: window_parameters.link_state_cues= {expected}, Actual: {cues}"
        ))
    }
}
