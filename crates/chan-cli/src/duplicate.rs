//! Derive a DVB channel that differs from an existing one in PLS
//!
//! The copy gets new classification annotations (and so a new id from the
//! naming rules), a link profile rebuilt around the fastest existing
//! profile, and a forward channel overriding the PLS.

use chan_rules::class_annos_to_name;
use chan_tree::{ChannelRecord, ChannelValue};
use serde_json::json;

use crate::error::{CommandError, CommandResult};

/// Overhead time given to every duplicated channel
pub const CONTACT_OVERHEAD_TIME: &str = "10s";

/// Downlink band of a DVB channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    S,
    X,
}

impl Band {
    fn pls_annotation(self) -> &'static str {
        match self {
            Self::S => "space_ground_sband_dvbs2x_pls",
            Self::X => "space_ground_xband_dvbs2x_pls",
        }
    }

    fn radio_band(self) -> &'static str {
        match self {
            Self::S => "SBAND",
            Self::X => "XBAND",
        }
    }
}

/// Whether the source channel also carries a UHF uplink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directionality {
    Txo,
    Bidir,
}

/// What the duplicate changes
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateRequest {
    /// PLS code of the new channel
    pub pls: u32,
    /// Elevation override, the source's when unset
    pub min_elevation_deg: Option<f64>,
    /// Bitrate override, the source's when unset
    pub bitrate_kbps: Option<f64>,
}

/// A request resolved against the source channel's template annotations
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatePlan {
    /// The user's request
    pub request: DuplicateRequest,
    /// Band of the source channel
    pub band: Band,
    /// Directionality of the source channel
    pub directionality: Directionality,
    /// Id of the derived channel
    pub channel: String,
}

fn truthy(annos: &ChannelRecord, key: &str) -> bool {
    annos.get(key).is_some_and(chan_tree::is_truthy)
}

impl DuplicatePlan {
    /// Check the source is a supported DVB channel and name the copy
    ///
    /// # Errors
    /// [`CommandError::Duplicate`] for S-band uplinks, non-DVB channels and
    /// unknown directionality; naming errors for the derived annotations.
    pub fn new(request: DuplicateRequest, template_annos: &ChannelRecord) -> CommandResult<Self> {
        if truthy(template_annos, "ground_space_sband") {
            return Err(CommandError::Duplicate("duplicate does not support S/X BIDIRs!".to_string()));
        }
        if !truthy(template_annos, "space_ground_xband_dvbs2x_pls")
            && !truthy(template_annos, "space_ground_sband_dvbs2x_pls")
        {
            return Err(CommandError::Duplicate("Only DVB channels can be duplicated!".to_string()));
        }

        let band = if truthy(template_annos, "space_ground_sband") {
            Band::S
        } else {
            Band::X
        };
        let directionality = match template_annos.get("directionality").and_then(ChannelValue::as_str) {
            Some("TXO") => Directionality::Txo,
            Some("BIDIR") => Directionality::Bidir,
            other => {
                return Err(CommandError::Duplicate(format!(
                    "Unsupported directionality {}",
                    other.unwrap_or("<missing>")
                )))
            }
        };

        let mut plan = Self {
            request,
            band,
            directionality,
            channel: String::new(),
        };
        plan.channel = class_annos_to_name(&plan.class_annos(template_annos))?;
        Ok(plan)
    }

    /// Annotations with the PLS replaced
    #[must_use]
    pub fn class_annos(&self, annos: &ChannelRecord) -> ChannelRecord {
        let mut annos = annos.clone();
        annos.insert(self.band.pls_annotation().to_string(), json!(self.request.pls));
        annos
    }

    /// Profile with the highest downlink rate, updated, then for BIDIR the
    /// slowest (UHF) profile unchanged
    #[must_use]
    pub fn link_profile(&self, profiles: &[ChannelValue]) -> Vec<ChannelValue> {
        let rate = |p: &ChannelValue| p.get("downlink_rate_kbps").and_then(ChannelValue::as_f64).unwrap_or(0.0);

        // First maximum and first minimum win ties.
        let mut fastest: Option<&ChannelValue> = None;
        let mut slowest: Option<&ChannelValue> = None;
        for profile in profiles {
            if fastest.map_or(true, |f| rate(profile) > rate(f)) {
                fastest = Some(profile);
            }
            if slowest.map_or(true, |s| rate(profile) < rate(s)) {
                slowest = Some(profile);
            }
        }

        let mut result = Vec::new();
        if let Some(fastest) = fastest {
            let mut dvb = fastest.clone();
            if let Some(fields) = dvb.as_object_mut() {
                if let Some(elevation) = self.request.min_elevation_deg {
                    fields.insert("min_elevation_deg".to_string(), json!(elevation));
                }
                if let Some(bitrate) = self.request.bitrate_kbps {
                    fields.insert("downlink_rate_kbps".to_string(), json!(bitrate));
                }
            }
            result.push(dvb);
        }
        if self.directionality == Directionality::Bidir {
            result.extend(slowest.cloned());
        }
        result
    }

    /// Forward channel carrying the new PLS
    #[must_use]
    pub fn forward_channel_override(&self) -> ChannelValue {
        json!({
            "radio_band": self.band.radio_band(),
            "bandaid_override": {"pls": self.request.pls}
        })
    }

    /// Window parameters with the DVB forward channel overridden
    ///
    /// # Errors
    /// [`CommandError::Duplicate`] when the existing forward channel has a
    /// key whose type differs from the override's.
    pub fn window_parameters(&self, original: &ChannelRecord) -> CommandResult<ChannelRecord> {
        let dvb = original
            .get("forward_channels")
            .and_then(ChannelValue::as_array)
            .and_then(|channels| {
                channels
                    .iter()
                    .find(|fc| fc.get("radio_band").and_then(ChannelValue::as_str) != Some("UHF"))
            });

        let mut forward_channels = Vec::new();
        if self.directionality == Directionality::Bidir {
            forward_channels.push(json!({"radio_band": "UHF"}));
        }
        forward_channels.push(match dvb {
            Some(existing) => merge_forward_channels(existing, &self.forward_channel_override())?,
            None => self.forward_channel_override(),
        });

        let mut result = original.clone();
        result.insert("forward_channels".to_string(), ChannelValue::Array(forward_channels));
        Ok(result)
    }

    /// Dynamic window parameters with the elevation threshold moved
    #[must_use]
    pub fn dynamic_window_parameters(&self, original: &ChannelRecord) -> ChannelRecord {
        let mut result = original.clone();
        let Some(elevation) = self.request.min_elevation_deg else {
            return result;
        };
        if let Some(times) = result.get_mut("transmit_times").and_then(ChannelValue::as_object_mut) {
            if times.get("elevation_threshold_deg").is_some_and(chan_tree::is_truthy) {
                times.insert("elevation_threshold_deg".to_string(), json!(elevation));
            }
        }
        result
    }

    /// Derive the new record from an existing one
    ///
    /// # Errors
    /// See [`DuplicatePlan::window_parameters`].
    pub fn derive(&self, existing: &ChannelRecord) -> CommandResult<ChannelRecord> {
        let object = |key: &str| existing.get(key).and_then(ChannelValue::as_object).cloned().unwrap_or_default();
        let mut record = existing.clone();
        record.insert("contact_overhead_time".to_string(), json!(CONTACT_OVERHEAD_TIME));

        // Satellites carry neither annotations nor link profiles.
        let annos = object("classification_annotations");
        if !annos.is_empty() {
            record.insert(
                "classification_annotations".to_string(),
                ChannelValue::Object(self.class_annos(&annos)),
            );
        }
        if let Some(profiles) = existing.get("link_profile").and_then(ChannelValue::as_array) {
            if !profiles.is_empty() {
                record.insert(
                    "link_profile".to_string(),
                    ChannelValue::Array(self.link_profile(profiles)),
                );
            }
        }

        record.insert(
            "window_parameters".to_string(),
            ChannelValue::Object(self.window_parameters(&object("window_parameters"))?),
        );

        let dynamic = self.dynamic_window_parameters(&object("dynamic_window_parameters"));
        if !dynamic.is_empty() {
            record.insert("dynamic_window_parameters".to_string(), ChannelValue::Object(dynamic));
        }
        Ok(record)
    }
}

/// Merge two forward channels, `overrides` winning; mappings recurse
///
/// # Errors
/// [`CommandError::Duplicate`] when a shared key changes type.
pub fn merge_forward_channels(base: &ChannelValue, overrides: &ChannelValue) -> CommandResult<ChannelValue> {
    let (Some(base_fields), Some(override_fields)) = (base.as_object(), overrides.as_object()) else {
        return Err(CommandError::Duplicate("forward channels must be mappings".to_string()));
    };
    let mut merged = base_fields.clone();
    for (key, value) in override_fields {
        let combined = match base_fields.get(key) {
            None => value.clone(),
            Some(existing) if existing.is_object() && value.is_object() => merge_forward_channels(existing, value)?,
            Some(existing) if chan_tree::kind_of(existing) != chan_tree::kind_of(value) => {
                return Err(CommandError::Duplicate(
                    "The same forward channel key has values of different type.".to_string(),
                ))
            }
            Some(_) => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    Ok(ChannelValue::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chan_test_utils::{gs_xband_record, uhf_class_annos, xband_class_annos, XBAND_CHANNEL};
    use pretty_assertions::assert_eq;

    fn record(value: ChannelValue) -> ChannelRecord {
        value.as_object().unwrap().clone()
    }

    fn request(pls: u32) -> DuplicateRequest {
        DuplicateRequest {
            pls,
            min_elevation_deg: Some(20.0),
            bitrate_kbps: Some(80_000.0),
        }
    }

    #[test]
    fn plan_names_the_copy() {
        let plan = DuplicatePlan::new(request(9), &record(xband_class_annos())).unwrap();
        assert_eq!(plan.band, Band::X);
        assert_eq!(plan.directionality, Directionality::Txo);
        assert_eq!(plan.channel, XBAND_CHANNEL.replace("_P5", "_P9"));
    }

    #[test]
    fn unsupported_sources() {
        let err = DuplicatePlan::new(request(9), &record(uhf_class_annos())).unwrap_err();
        assert_eq!(err.to_string(), "Only DVB channels can be duplicated!");

        let mut sx = record(xband_class_annos());
        sx.insert("ground_space_sband".to_string(), json!(true));
        let err = DuplicatePlan::new(request(9), &sx).unwrap_err();
        assert_eq!(err.to_string(), "duplicate does not support S/X BIDIRs!");
    }

    #[test]
    fn derived_gs_record() {
        let plan = DuplicatePlan::new(request(9), &record(xband_class_annos())).unwrap();
        let derived = plan.derive(&record(gs_xband_record(true))).unwrap();

        assert_eq!(derived["classification_annotations"]["space_ground_xband_dvbs2x_pls"], json!(9));
        assert_eq!(
            derived["link_profile"],
            json!([{"downlink_rate_kbps": 80_000.0, "min_elevation_deg": 20.0}])
        );
        assert_eq!(
            derived["window_parameters"],
            json!({"forward_channels": [{"bandaid_override": {"pls": 9}, "radio_band": "XBAND"}]})
        );
        assert_eq!(derived["contact_overhead_time"], json!("10s"));
    }

    #[test]
    fn bidir_keeps_uhf_profile_and_channel() {
        let mut annos = record(xband_class_annos());
        annos.insert("directionality".to_string(), json!("BIDIR"));
        let plan = DuplicatePlan::new(request(13), &annos).unwrap();

        let profiles = [
            json!({"downlink_rate_kbps": 9.6, "min_elevation_deg": 10}),
            json!({"downlink_rate_kbps": 50_000, "min_elevation_deg": 15}),
        ];
        assert_eq!(
            plan.link_profile(&profiles),
            vec![
                json!({"downlink_rate_kbps": 80_000.0, "min_elevation_deg": 20.0}),
                json!({"downlink_rate_kbps": 9.6, "min_elevation_deg": 10}),
            ]
        );

        let window = plan
            .window_parameters(&record(json!({
                "forward_channels": [{"radio_band": "UHF"}, {"radio_band": "XBAND", "symbol_rate": 5}]
            })))
            .unwrap();
        assert_eq!(
            ChannelValue::Object(window),
            json!({"forward_channels": [
                {"radio_band": "UHF"},
                {"radio_band": "XBAND", "symbol_rate": 5, "bandaid_override": {"pls": 13}}
            ]})
        );
    }

    #[test]
    fn dynamic_threshold_follows_elevation() {
        let plan = DuplicatePlan::new(request(9), &record(xband_class_annos())).unwrap();
        let moved = plan.dynamic_window_parameters(&record(json!({"transmit_times": {"elevation_threshold_deg": 5}})));
        assert_eq!(moved["transmit_times"]["elevation_threshold_deg"], json!(20.0));

        let untouched = plan.dynamic_window_parameters(&record(json!({"transmit_times": {}})));
        assert_eq!(ChannelValue::Object(untouched), json!({"transmit_times": {}}));
    }

    #[test]
    fn forward_channel_type_conflicts() {
        let err = merge_forward_channels(&json!({"bandaid_override": 3}), &json!({"bandaid_override": {"pls": 9}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "The same forward channel key has values of different type.");
    }
}
