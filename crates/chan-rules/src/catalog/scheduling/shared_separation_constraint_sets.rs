use chan_tree::{ChannelRecord, ChannelValue};

use crate::catalog::{mappings, nested, str_field};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.shared_separation_constraint_sets";

/// Separation constraint type referencing a shared set by name
pub(crate) const SHARED_SET_REFERENCE: &str = "shared_constraint_set";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "references_to_shared_constraint_set_must_exist",
        "Any reference to a shared constraint set must exist",
        RuleCheck::SatelliteChannel(references_to_shared_constraint_set_must_exist),
    ));
    registry.register(Rule::new(
        MODULE,
        "no_references_between_shared_constraint_sets",
        "Shared separation constraint sets must not reference other sets",
        RuleCheck::General(no_references_between_shared_constraint_sets),
    ));
}

fn shared_set_references(constraints: Option<&ChannelValue>) -> impl Iterator<Item = &ChannelRecord> {
    mappings(constraints)
        .into_iter()
        .filter(|constraint| str_field(constraint, "type") == Some(SHARED_SET_REFERENCE))
}

fn references_to_shared_constraint_set_must_exist(
    input: &ValidationRuleInput,
    _: &str,
    _: &str,
    _: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    for reference in shared_set_references(nested(record, &["satellite_constraints", "separation"])) {
        let name = str_field(reference, "name").unwrap_or_default();
        if !input.shared_constraint_sets.contains_key(name) {
            return RuleOutcome::fail_with(format!("References unknown shared constraint set '{name}'"));
        }
    }
    RuleOutcome::Pass
}

fn no_references_between_shared_constraint_sets(input: &ValidationRuleInput) -> RuleOutcome {
    for (name, set) in &input.shared_constraint_sets {
        if shared_set_references(Some(set)).next().is_some() {
            return RuleOutcome::fail_with(format!(
                "Shared constraint set '{name}' tries to reference other shared sets, this is disallowed"
            ));
        }
    }
    RuleOutcome::Pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    fn input() -> ValidationRuleInput {
        let mut input = ValidationRuleInput::default();
        input
            .shared_constraint_sets
            .insert("spire_nasa_xband_coordination".into(), json!([{"type": "min_separation"}]));
        input
    }

    #[test]
    fn references_must_resolve() {
        let input = input();
        let empty = ChannelRecord::new();
        let known = record(json!({"satellite_constraints": {"separation": [
            {"type": "shared_constraint_set", "name": "spire_nasa_xband_coordination"},
            {"type": "min_separation"}
        ]}}));
        let unknown = record(json!({"satellite_constraints": {"separation": [
            {"type": "shared_constraint_set", "name": "nope"}
        ]}}));
        assert!(references_to_shared_constraint_set_must_exist(&input, "FM1", "C", &empty, &known).is_pass());
        assert_eq!(
            references_to_shared_constraint_set_must_exist(&input, "FM1", "C", &empty, &unknown).reason(),
            Some("References unknown shared constraint set 'nope'")
        );
        assert!(references_to_shared_constraint_set_must_exist(&input, "FM1", "C", &empty, &empty).is_pass());
    }

    #[test]
    fn sets_must_not_nest() {
        let mut input = input();
        assert!(no_references_between_shared_constraint_sets(&input).is_pass());
        input.shared_constraint_sets.insert(
            "outer".into(),
            json!([{"type": "shared_constraint_set", "name": "spire_nasa_xband_coordination"}]),
        );
        assert!(!no_references_between_shared_constraint_sets(&input).is_pass());
    }
}
