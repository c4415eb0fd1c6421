use chan_tree::ChannelRecord;

use crate::input::ValidationRuleInput;
use crate::naming::class_annos_to_name;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.channel_naming";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "check_channel_names_are_correct",
        "Check channel names are correct",
        RuleCheck::GroundStationTemplateChannel(check_channel_names_are_correct),
    ));
}

fn check_channel_names_are_correct(
    _: &ValidationRuleInput,
    channel_id: &str,
    annos: &ChannelRecord,
    _: &ChannelRecord,
) -> RuleOutcome {
    match class_annos_to_name(annos) {
        Ok(expected) if expected == channel_id => RuleOutcome::Pass,
        Ok(expected) => RuleOutcome::fail_with(format!(
            "Channel name was {channel_id} but classification annotations imply {expected}"
        )),
        Err(err) => RuleOutcome::fail_with(err.to_string()),
    }
}
