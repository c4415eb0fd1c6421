//! Built-in catalog against fixture channel sets

use chan_rules::{Environment, RuleEngine, RuleMode, RuleRegistry, RuleSelection, ValidationRuleInput};
use chan_test_utils::{
    gs_templates, gs_uhf_record, gs_xband_record, sat_templates, sat_uhf_record, sat_xband_record, with_field,
    UHF_CHANNEL, XBAND_CHANNEL,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn mapping(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn fixture_input(environment: Environment) -> ValidationRuleInput {
    let mut input = ValidationRuleInput::new(environment);
    input.gs_templates = mapping(gs_templates());
    input.sat_templates = mapping(sat_templates());
    for gs in ["alpha-gs", "bravo-gs", "charlie-gs"] {
        input.gs_configs.insert(
            gs.to_string(),
            mapping(json!({UHF_CHANNEL: gs_uhf_record(true), XBAND_CHANNEL: gs_xband_record(true)})),
        );
    }
    for sat in ["FM101", "FM102"] {
        input.sat_configs.insert(
            sat.to_string(),
            mapping(json!({UHF_CHANNEL: sat_uhf_record(true), XBAND_CHANNEL: null})),
        );
    }
    input
}

#[test]
fn fixture_configs_pass_every_enforced_rule() {
    let registry = RuleRegistry::with_defaults();
    for environment in Environment::ALL {
        let report = RuleEngine::new(&registry).run(&fixture_input(environment));
        let failures: Vec<String> = report.enforced().map(|v| format!("{}.{}: {:?}", v.module, v.name, v.cases)).collect();
        assert!(failures.is_empty(), "{environment}: {failures:#?}");
    }
}

#[test]
fn environment_restricted_rules_are_filtered_per_environment() {
    let registry = RuleRegistry::with_defaults();
    let staging = RuleEngine::new(&registry).run(&fixture_input(Environment::Staging));
    let production = RuleEngine::new(&registry).run(&fixture_input(Environment::Production));

    assert!(staging
        .filtered_out
        .contains(&"constpipe.adcs_config_consistency.adcs_pointing_track_implies_tracking_target_config".to_string()));
    assert!(production
        .filtered_out
        .contains(&"constpipe.adcs_config_consistency.adcs_pointing_track_implies_adcs_config_config".to_string()));
    assert_eq!(staging.results.len() + staging.filtered_out.len(), registry.len());
}

#[test]
fn enforced_failures_aggregate_and_complaints_do_not_fail() {
    let mut input = fixture_input(Environment::Staging);

    // Two of three ground stations drift from the template annotations.
    for gs in ["alpha-gs", "charlie-gs"] {
        let config = input.gs_configs.get_mut(gs).unwrap();
        let drifted = with_field(
            gs_uhf_record(true),
            "classification_annotations",
            json!({"provider": "SPIRE"}),
        );
        config.insert(UHF_CHANNEL.to_string(), drifted);
    }
    // One satellite flies X-band without the coordination set.
    input
        .sat_configs
        .get_mut("FM102")
        .unwrap()
        .insert(XBAND_CHANNEL.to_string(), sat_xband_record(true));

    let registry = RuleRegistry::with_defaults();
    let report = RuleEngine::new(&registry).run(&input);

    let complaints: Vec<_> = report.complaints().collect();
    assert_eq!(complaints.len(), 1);
    assert_eq!(complaints[0].mode, RuleMode::Complain);
    assert_eq!(complaints[0].cases, vec![format!("{XBAND_CHANNEL} on FM102")]);

    let err = report.into_result().unwrap_err();
    assert_eq!(err.violations().len(), 1);
    let violation = &err.violations()[0];
    assert_eq!(violation.name, "gs_class_annos_must_match_template");
    assert_eq!(
        violation.cases,
        vec![format!("{UHF_CHANNEL} on alpha-gs"), format!("{UHF_CHANNEL} on charlie-gs")]
    );
    assert!(!err.to_string().contains("FM102"));
}

#[test]
fn selection_narrows_the_run() {
    let mut input = fixture_input(Environment::Staging);
    input.gs_templates.insert(
        UHF_CHANNEL.to_string(),
        with_field(gs_uhf_record(false), "enabled", json!(true)),
    );

    let registry = RuleRegistry::with_defaults();
    let report = RuleEngine::new(&registry)
        .with_selection(RuleSelection::all().with_module("template_channels").with_name("gs_"))
        .run(&input);

    assert_eq!(report.results.len(), 2);
    let failed: Vec<&str> = report.enforced().map(|v| v.name.as_str()).collect();
    assert_eq!(failed, vec!["gs_template_channels_must_have_enabled_false"]);
    assert_eq!(report.enforced().next().unwrap().cases, vec![UHF_CHANNEL.to_string()]);
}
