use crate::catalog::{nested, render_list, truthy};
use crate::input::{configured_channels, AssetConfig, ClassAnnotationMap, ValidationRuleInput};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.interval_charge_constraint";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "enabled_channels_electrical_costs_all_or_none",
        "Either all enabled channels should have electrical costs or none should",
        RuleCheck::Satellite(enabled_channels_electrical_costs_all_or_none),
    ));
}

fn enabled_channels_electrical_costs_all_or_none(
    _: &ValidationRuleInput,
    _: &str,
    config: &AssetConfig,
    _: &ClassAnnotationMap,
) -> RuleOutcome {
    let (with, without): (Vec<&str>, Vec<&str>) = {
        let mut with = Vec::new();
        let mut without = Vec::new();
        for (channel, record) in configured_channels(config).filter(|(_, r)| truthy(r, "enabled")) {
            if nested(record, &["satellite_constraints", "electrical_cost"]).is_some() {
                with.push(channel.as_str());
            } else {
                without.push(channel.as_str());
            }
        }
        (with, without)
    };

    if with.is_empty() || without.is_empty() {
        return RuleOutcome::Pass;
    }
    RuleOutcome::fail_with(format!(
        "{} channels with elec. costs {}, {} channels without elec. costs {}",
        with.len(),
        render_list(&with),
        without.len(),
        render_list(&without)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    fn run(config: serde_json::Value) -> RuleOutcome {
        enabled_channels_electrical_costs_all_or_none(
            &ValidationRuleInput::default(),
            "FM1",
            &record(config),
            &ClassAnnotationMap::new(),
        )
    }

    #[test]
    fn all_or_none() {
        assert!(run(json!({
            "A": {"enabled": true, "satellite_constraints": {"electrical_cost": 3}},
            "B": {"enabled": true, "satellite_constraints": {"electrical_cost": 4}}
        }))
        .is_pass());
        assert!(run(json!({"A": {"enabled": true}, "B": {"enabled": true}})).is_pass());
        assert!(run(json!({
            "A": {"enabled": true, "satellite_constraints": {"electrical_cost": 3}},
            "B": {"enabled": false},
            "C": null
        }))
        .is_pass());
    }

    #[test]
    fn mixed_costs_fail() {
        assert_eq!(
            run(json!({
                "A": {"enabled": true, "satellite_constraints": {"electrical_cost": 3}},
                "B": {"enabled": true}
            }))
            .reason(),
            Some("1 channels with elec. costs [A], 1 channels without elec. costs [B]")
        );
    }
}
