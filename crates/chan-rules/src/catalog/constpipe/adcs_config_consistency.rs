//! `adcs_pointing` annotations against the ADCS window parameters
//!
//! Production still schedules pointing through `tracking_target`; staging
//! has moved to `adcs_config`. The rules for each are restricted to their
//! environment.

use chan_tree::ChannelRecord;

use crate::catalog::{nested, str_field};
use crate::environment::Environment;
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "constpipe.adcs_config_consistency";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "satellite_should_not_define_tracking_target",
        "tracking_target should not be defined in a satellite channel",
        RuleCheck::SatelliteChannel(|_, _, _, _, record| (!has_tracking_target(record)).into()),
    ));
    registry.register(
        Rule::new(
            MODULE,
            "adcs_pointing_track_implies_tracking_target_config",
            "If adcs_pointing is TRACK, then tracking_target config should be specified",
            RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
                (!is_track(annos) || has_tracking_target(record)).into()
            }),
        )
        .only_in(Environment::Production),
    );
    registry.register(
        Rule::new(
            MODULE,
            "adcs_pointing_track_implies_adcs_config_config",
            "If adcs_pointing is TRACK or HALFTRACK then adcs_config config should be specified",
            RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
                (!is_pointing(annos) || has_adcs_config(record)).into()
            }),
        )
        .only_in(Environment::Staging),
    );
    registry.register(
        Rule::new(
            MODULE,
            "adcs_pointing_not_track_implies_no_tracking_target_config",
            "If adcs_pointing is not TRACK then tracking_target config should not be specified",
            RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
                (is_track(annos) || !has_tracking_target(record)).into()
            }),
        )
        .only_in(Environment::Production),
    );
    registry.register(
        Rule::new(
            MODULE,
            "adcs_pointing_not_track_implies_no_adcs_config",
            "If adcs_pointing is not TRACK or HALFTRACK then adcs_config config should not be specified",
            RuleCheck::GroundStationChannel(|_, _, _, annos, record| {
                (is_pointing(annos) || !has_adcs_config(record)).into()
            }),
        )
        .only_in(Environment::Staging),
    );
    registry.register(
        Rule::new(
            MODULE,
            "dynamic_adcs_coords_should_only_be_set_if_adcs_config_present",
            "adcs_config_target_coords should only be specified when adcs_config is present",
            RuleCheck::GroundStationChannel(dynamic_adcs_coords_need_adcs_config),
        )
        .only_in(Environment::Staging),
    );
}

fn is_track(annos: &ChannelRecord) -> bool {
    str_field(annos, "adcs_pointing") == Some("TRACK")
}

fn is_pointing(annos: &ChannelRecord) -> bool {
    matches!(str_field(annos, "adcs_pointing"), Some("TRACK" | "HALFTRACK"))
}

fn has_tracking_target(record: &ChannelRecord) -> bool {
    nested(record, &["window_parameters", "tracking_target"]).is_some()
}

fn has_adcs_config(record: &ChannelRecord) -> bool {
    nested(record, &["window_parameters", "adcs_config"]).is_some()
}

fn dynamic_adcs_coords_need_adcs_config(
    _: &ValidationRuleInput,
    _: &str,
    _: &str,
    _: &ChannelRecord,
    record: &ChannelRecord,
) -> RuleOutcome {
    let has_coords = nested(record, &["dynamic_window_parameters", "adcs_config_target_coords"])
        .is_some_and(chan_tree::is_truthy);
    let has_config = nested(record, &["window_parameters", "adcs_config"]).is_some_and(chan_tree::is_truthy);
    (!has_coords || has_config).into()
}
