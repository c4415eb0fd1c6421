use chan_tree::{ChannelRecord, ChannelValue};

use crate::catalog::{mappings, nested, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.sband_bidirs";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "check_transmit_times_elevation_exists_and_matches_innermost_link_profile_min_elevation",
        "Transmit times elevation must exist and match innermost link profile min elevation",
        RuleCheck::GroundStationChannel(transmit_times_elevation_matches_link_profile),
    ));
}

fn transmit_times_elevation_matches_link_profile(
    _: &ValidationRuleInput,
    _: &str,
    _: &str,
    annos: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    let is_s_u_bidir = ["space_ground_uhf", "ground_space_uhf", "space_ground_sband"]
        .iter()
        .all(|key| truthy(annos, key));
    if !is_s_u_bidir {
        return RuleOutcome::Pass;
    }

    let innermost = mappings(record.get("link_profile"))
        .iter()
        .filter_map(|profile| profile.get("min_elevation_deg").and_then(ChannelValue::as_f64))
        .reduce(f64::max);
    let Some(innermost) = innermost else {
        return RuleOutcome::fail_with("S-Band BIDIRs must have link profile min elevations");
    };

    let threshold = nested(
        record,
        &["dynamic_window_parameters", "transmit_times", "elevation_threshold_deg"],
    )
    .and_then(ChannelValue::as_f64)
    .filter(|elevation| *elevation != 0.0);
    let Some(threshold) = threshold else {
        return RuleOutcome::fail_with("S-Band BIDIRs must have transmit times min elevation");
    };

    if (innermost - threshold).abs() < f64::EPSILON {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!("{innermost} is not equal to {threshold}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    fn run(annos: serde_json::Value, config: serde_json::Value) -> RuleOutcome {
        transmit_times_elevation_matches_link_profile(
            &ValidationRuleInput::default(),
            "gs",
            "C",
            &record(annos),
            &record(config),
        )
    }

    fn s_u() -> serde_json::Value {
        json!({"space_ground_uhf": true, "ground_space_uhf": true, "space_ground_sband": true})
    }

    #[test]
    fn other_classes_pass() {
        assert!(run(json!({"space_ground_xband": true}), json!({})).is_pass());
    }

    #[test]
    fn threshold_must_match_innermost_profile() {
        let profiles = json!([{"min_elevation_deg": 10}, {"min_elevation_deg": 25}]);
        let matching = json!({
            "link_profile": profiles,
            "dynamic_window_parameters": {"transmit_times": {"elevation_threshold_deg": 25}}
        });
        assert!(run(s_u(), matching).is_pass());

        let off = json!({
            "link_profile": profiles,
            "dynamic_window_parameters": {"transmit_times": {"elevation_threshold_deg": 10}}
        });
        assert_eq!(run(s_u(), off).reason(), Some("25 is not equal to 10"));

        let missing = json!({"link_profile": profiles});
        assert_eq!(
            run(s_u(), missing).reason(),
            Some("S-Band BIDIRs must have transmit times min elevation")
        );
    }
}
