//! The effective DVBS2X PLS must match the channel's annotated PLS
//!
//! Ground stations fall back to the modem default when no override is set,
//! so their effective value is always checked. Satellites are only checked
//! when they configure an override.

use chan_tree::{is_truthy, ChannelRecord, ChannelValue};
use serde_json::json;

use crate::catalog::{mappings, nested, render, same_value, str_field, truthy};
use crate::input::ValidationRuleInput;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleCheck, RuleOutcome};

const MODULE: &str = "constpipe.pls_consistency";

const SBAND_DEFAULT_PLS: u64 = 39;
const XBAND_DEFAULT_PLS: u64 = 5;

#[derive(Debug, Clone, Copy)]
enum Band {
    Sband,
    Xband,
}

impl Band {
    const fn radio_band(self) -> &'static str {
        match self {
            Self::Sband => "SBAND",
            Self::Xband => "XBAND",
        }
    }

    const fn default_pls(self) -> u64 {
        match self {
            Self::Sband => SBAND_DEFAULT_PLS,
            Self::Xband => XBAND_DEFAULT_PLS,
        }
    }

    const fn pls_annotation(self) -> &'static str {
        match self {
            Self::Sband => "space_ground_sband_dvbs2x_pls",
            Self::Xband => "space_ground_xband_dvbs2x_pls",
        }
    }

    /// Whether the channel carries DVBS2X on this band
    fn applies(self, annos: &ChannelRecord) -> bool {
        match self {
            Self::Sband => {
                truthy(annos, "space_ground_sband")
                    && str_field(annos, "space_ground_sband_encoding") == Some("DVBS2X")
            }
            Self::Xband => truthy(annos, "space_ground_xband"),
        }
    }
}

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(Rule::new(
        MODULE,
        "gs_channel_sband_down_dvbs2x_class_anno_pls_must_match_effective_pls",
        "GS SBand down DVBS2X PLS value from classification annotation must match effective value",
        RuleCheck::GroundStationChannel(|_, _, _, annos, record| effective_pls_matches(Band::Sband, annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "gs_channel_xband_down_dvbs2x_class_anno_pls_must_match_effective_pls",
        "GS XBand down DVBS2X PLS value from classification annotation must match effective value",
        RuleCheck::GroundStationChannel(|_, _, _, annos, record| effective_pls_matches(Band::Xband, annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "satellite_channel_sband_down_dvbs2x_class_anno_pls_must_match_any_configured_pls",
        "Satellite SBand down DVBS2X PLS value from classification annotation must match any configured value",
        RuleCheck::SatelliteChannel(|_, _, _, annos, record| configured_pls_matches(Band::Sband, annos, record)),
    ));
    registry.register(Rule::new(
        MODULE,
        "satellite_channel_xband_down_dvbs2x_class_anno_pls_must_match_any_configured_pls",
        "Satellite XBand down DVBS2X PLS value from classification annotation must match any configured value",
        RuleCheck::SatelliteChannel(|_, _, _, annos, record| configured_pls_matches(Band::Xband, annos, record)),
    ));
}

/// PLS override of the band's forward channel
///
/// A lone forward channel without a `radio_band`, or with the right one, is
/// the band's channel. Otherwise the first forward channel naming the band is.
fn configured_pls(record: &ChannelRecord, band: Band) -> Option<&ChannelValue> {
    let forward = mappings(nested(record, &["window_parameters", "forward_channels"]));
    let channel = match forward.as_slice() {
        [only] if str_field(only, "radio_band").map_or(true, |b| b == band.radio_band()) => Some(*only),
        _ => forward
            .iter()
            .copied()
            .find(|channel| str_field(channel, "radio_band") == Some(band.radio_band())),
    }?;
    nested(channel, &["bandaid_override", "pls"])
}

fn effective_pls_matches(band: Band, annos: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    if !band.applies(annos) {
        return RuleOutcome::Pass;
    }
    let annotated = annos.get(band.pls_annotation());
    let effective = configured_pls(record, band)
        .filter(|pls| is_truthy(pls))
        .cloned()
        .unwrap_or_else(|| json!(band.default_pls()));

    if annotated.is_some_and(|a| same_value(a, &effective)) {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail_with(format!(
            "annotation PLS {}, effective PLS {}",
            render(annotated),
            render(Some(&effective))
        ))
    }
}

fn configured_pls_matches(band: Band, annos: &ChannelRecord, record: &ChannelRecord) -> RuleOutcome {
    if !band.applies(annos) {
        return RuleOutcome::Pass;
    }
    let annotated = annos.get(band.pls_annotation());
    match configured_pls(record, band) {
        None => RuleOutcome::Pass,
        Some(configured) if annotated.is_some_and(|a| same_value(a, configured)) => RuleOutcome::Pass,
        Some(configured) => RuleOutcome::fail_with(format!(
            "annotation PLS {}, configured PLS {}",
            render(annotated),
            render(Some(configured))
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use chan_test_utils::{gs_xband_record, xband_class_annos};

    fn sband_annos(pls: u64) -> ChannelRecord {
        record(json!({
            "space_ground_sband": true,
            "space_ground_sband_encoding": "DVBS2X",
            "space_ground_sband_dvbs2x_pls": pls
        }))
    }

    #[test]
    fn gs_fixture_matches() {
        let annos = record(xband_class_annos());
        assert!(effective_pls_matches(Band::Xband, &annos, &record(gs_xband_record(true))).is_pass());
    }

    #[test]
    fn gs_default_pls_applies() {
        let no_override = record(json!({"window_parameters": {"forward_channels": [{"radio_band": "SBAND"}]}}));
        assert!(effective_pls_matches(Band::Sband, &sband_annos(39), &no_override).is_pass());
        assert_eq!(
            effective_pls_matches(Band::Sband, &sband_annos(41), &no_override).reason(),
            Some("annotation PLS 41, effective PLS 39")
        );
        assert!(effective_pls_matches(Band::Sband, &sband_annos(41), &ChannelRecord::new()).reason().is_some());
    }

    #[test]
    fn forward_channel_selection() {
        let two = record(json!({"window_parameters": {"forward_channels": [
            {"radio_band": "UHF", "bandaid_override": {"pls": 3}},
            {"radio_band": "SBAND", "bandaid_override": {"pls": 41}}
        ]}}));
        assert_eq!(configured_pls(&two, Band::Sband), Some(&json!(41)));
        assert_eq!(configured_pls(&two, Band::Xband), None);

        let unnamed = record(json!({"window_parameters": {"forward_channels": [
            {"bandaid_override": {"pls": 7}}
        ]}}));
        assert_eq!(configured_pls(&unnamed, Band::Xband), Some(&json!(7)));

        let other_band = record(json!({"window_parameters": {"forward_channels": [
            {"radio_band": "UHF", "bandaid_override": {"pls": 7}}
        ]}}));
        assert_eq!(configured_pls(&other_band, Band::Sband), None);
    }

    #[test]
    fn satellite_only_checks_configured_overrides() {
        let annos = sband_annos(39);
        assert!(configured_pls_matches(Band::Sband, &annos, &ChannelRecord::new()).is_pass());
        let overridden = record(json!({"window_parameters": {"forward_channels": [
            {"radio_band": "SBAND", "bandaid_override": {"pls": 41}}
        ]}}));
        assert_eq!(
            configured_pls_matches(Band::Sband, &annos, &overridden).reason(),
            Some("annotation PLS 39, configured PLS 41")
        );
    }
}
