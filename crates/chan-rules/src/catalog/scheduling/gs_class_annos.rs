use chan_tree::{ChannelRecord, ChannelValue};

use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.gs_class_annos";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "gs_class_annos_must_match_template",
        "GS config classification annotation must match those in GS template",
        RuleCheck::GroundStationChannel(gs_class_annos_must_match_template),
    ));
}

fn gs_class_annos_must_match_template(
    _: &ValidationRuleInput,
    _: &str,
    _: &str,
    annos: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    match record.get("classification_annotations").and_then(ChannelValue::as_object) {
        None => RuleOutcome::fail_with("channel has no classification_annotations"),
        Some(configured) => (configured == annos).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use chan_test_utils::{gs_uhf_record, uhf_class_annos, with_field};
    use serde_json::json;

    #[test]
    fn matches_template() {
        let input = ValidationRuleInput::default();
        let annos = record(uhf_class_annos());
        let config = record(gs_uhf_record(true));
        assert!(gs_class_annos_must_match_template(&input, "gs", "C", &annos, &config).is_pass());

        let drifted = record(with_field(gs_uhf_record(true), "classification_annotations", json!({"provider": "KSAT"})));
        assert_eq!(
            gs_class_annos_must_match_template(&input, "gs", "C", &annos, &drifted),
            RuleOutcome::Fail
        );

        let bare = record(json!({"enabled": true}));
        assert!(gs_class_annos_must_match_template(&input, "gs", "C", &annos, &bare)
            .reason()
            .is_some());
    }
}
