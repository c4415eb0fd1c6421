//! Template channels are definitions only and must never be schedulable

use chan_tree::ChannelRecord;

use crate::catalog::truthy;
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.template_channels_enable_legal_flags";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "gs_template_channels_must_have_enabled_false",
        "Groundstation template channels must have 'enabled' flag set to false",
        RuleCheck::GroundStationTemplateChannel(enabled_false),
    ));
    registry.register(Rule::new(
        MODULE,
        "gs_template_channels_must_have_legal_false",
        "Groundstation template channels must have 'legal' flag set to false",
        RuleCheck::GroundStationTemplateChannel(legal_false),
    ));
    registry.register(Rule::new(
        MODULE,
        "sat_template_channels_must_have_enabled_false",
        "Satellite template channels must have 'enabled' flag set to false",
        RuleCheck::SatelliteTemplateChannel(enabled_false),
    ));
    registry.register(Rule::new(
        MODULE,
        "sat_template_channels_must_have_legal_false",
        "Satellite template channels must have 'legal' flag set to false",
        RuleCheck::SatelliteTemplateChannel(legal_false),
    ));
}

fn enabled_false(_: &ValidationRuleInput, _: &str, _: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    (!truthy(record, "enabled")).into()
}

fn legal_false(_: &ValidationRuleInput, _: &str, _: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    (!truthy(record, "legal")).into()
}
