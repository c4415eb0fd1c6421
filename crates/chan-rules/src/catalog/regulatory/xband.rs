use chan_tree::ChannelRecord;

use crate::catalog::{mappings, nested, str_field, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleMode, RuleOutcome};

const MODULE: &str = "regulatory.xband";

const COORDINATION_SET: &str = "spire_nasa_xband_coordination";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(
        Rule::new(
            MODULE,
            "space_ground_xband_must_enforce_spire_nasa_xband_coordination",
            "Space-to-ground XBand separation constraints must use shared constraint set 'spire_nasa_xband_coordination'",
            RuleCheck::SatelliteChannel(space_ground_xband_must_enforce_coordination),
        )
        .with_mode(RuleMode::Complain),
    );
}

fn space_ground_xband_must_enforce_coordination(
    _: &ValidationRuleInput,
    _: &str,
    _: &str,
    annos: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    if !truthy(annos, "space_ground_xband") {
        return RuleOutcome::Pass;
    }
    mappings(nested(record, &["satellite_constraints", "separation"]))
        .into_iter()
        .any(|constraint| {
            str_field(constraint, "type") == Some("shared_constraint_set")
                && str_field(constraint, "name") == Some(COORDINATION_SET)
        })
        .into()
}
