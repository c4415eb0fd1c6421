//! Provider-specific constraint fields
//!
//! | Provider | Satellite constraints                          | GS constraints          |
//! |----------|------------------------------------------------|-------------------------|
//! | SPIRE    | forbids `budget_name`, `fixed_contact_duration` | forbids `dollar_cost`  |
//! | KSAT     | requires `budget_name`, `fixed_contact_duration`| requires `dollar_cost` |
//!
//! Providers without an entry are not checked.

use chan_tree::{ChannelRecord, ChannelValue};

use crate::catalog::str_field;
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "scheduling.gs_provider_validation";

#[derive(Debug, Clone, Copy)]
struct ConstraintSchema {
    required: &'static [&'static str],
    forbidden: &'static [&'static str],
}

fn sat_constraint_schema(provider: &str) -> Option<ConstraintSchema> {
    match provider {
        "SPIRE" => Some(ConstraintSchema {
            required: &[],
            forbidden: &["budget_name", "fixed_contact_duration"],
        }),
        "KSAT" => Some(ConstraintSchema {
            required: &["budget_name", "fixed_contact_duration"],
            forbidden: &[],
        }),
        _ => None,
    }
}

fn gs_constraint_schema(provider: &str) -> Option<ConstraintSchema> {
    match provider {
        "SPIRE" => Some(ConstraintSchema {
            required: &[],
            forbidden: &["dollar_cost"],
        }),
        "KSAT" => Some(ConstraintSchema {
            required: &["dollar_cost"],
            forbidden: &[],
        }),
        _ => None,
    }
}

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "validate_sat_constraints_for_gs_provider",
        "Validate ground station provider specific satellite constraints",
        RuleCheck::SatelliteChannel(|_, _, _, annos, record| {
            check_provider_constraints(annos, record, "satellite_constraints", sat_constraint_schema)
        }),
    ));
    registry.register(Rule::new(
        MODULE,
        "validate_gs_constraints_for_gs_provider",
        "Validate ground station provider specific ground station constraints",
        RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
            check_provider_constraints(annos, record, "ground_station_constraints", gs_constraint_schema)
        }),
    ));
}

fn check_provider_constraints(
    annos: &ChannelRecord,
    record: &ChannelRecord,
    constraints_key: &str,
    schema_for: fn(&str) -> Option<ConstraintSchema>,
) -> RuleOutcome {
    let Some(provider) = str_field(annos, "provider") else {
        return RuleOutcome::fail_with("No provider specified in class annotations");
    };
    let Some(schema) = schema_for(provider) else {
        return RuleOutcome::Pass;
    };

    let empty = ChannelRecord::new();
    let constraints = record
        .get(constraints_key)
        .and_then(ChannelValue::as_object)
        .unwrap_or(&empty);

    let errors: Vec<String> = schema
        .required
        .iter()
        .filter(|field| !constraints.contains_key(**field))
        .map(|field| format!("Missing field '{field}' in constraints"))
        .chain(
            schema
                .forbidden
                .iter()
                .filter(|field| constraints.contains_key(**field))
                .map(|field| format!("Forbidden field '{field}' in constraints")),
        )
        .collect();

    if errors.is_empty() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "For provider '{provider}' the following validation errors are detected: {}",
            errors.join("; ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use serde_json::json;

    #[test]
    fn spire_forbids_ksat_fields() {
        let annos = record(json!({"provider": "SPIRE"}));
        let clean = record(json!({"satellite_constraints": {"separation": []}}));
        let dirty = record(json!({"satellite_constraints": {"budget_name": "b"}}));
        assert!(check_provider_constraints(&annos, &clean, "satellite_constraints", sat_constraint_schema).is_pass());
        assert_eq!(
            check_provider_constraints(&annos, &dirty, "satellite_constraints", sat_constraint_schema).reason(),
            Some("For provider 'SPIRE' the following validation errors are detected: Forbidden field 'budget_name' in constraints")
        );
    }

    #[test]
    fn ksat_requires_fields() {
        let annos = record(json!({"provider": "KSAT"}));
        let outcome = check_provider_constraints(&annos, &ChannelRecord::new(), "ground_station_constraints", gs_constraint_schema);
        assert_eq!(
            outcome.reason(),
            Some("For provider 'KSAT' the following validation errors are detected: Missing field 'dollar_cost' in constraints")
        );
        let costed = record(json!({"ground_station_constraints": {"dollar_cost": 12}}));
        assert!(check_provider_constraints(&annos, &costed, "ground_station_constraints", gs_constraint_schema).is_pass());
    }

    #[test]
    fn provider_presence() {
        assert_eq!(
            check_provider_constraints(&ChannelRecord::new(), &ChannelRecord::new(), "satellite_constraints", sat_constraint_schema)
                .reason(),
            Some("No provider specified in class annotations")
        );
        let other = record(json!({"provider": "AWS"}));
        assert!(check_provider_constraints(&other, &ChannelRecord::new(), "satellite_constraints", sat_constraint_schema).is_pass());
    }
}
