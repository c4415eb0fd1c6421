//! Channel naming derivation
//!
//! A channel's canonical id is built from its classification annotations:
//!
//! ```text
//! <prefix>[_<provider>][_BW<bw>][_LEG|_P<pls>][_F<mid freq>][_<adcs pointing>][_JIRA_<ticket>]
//! ```
//!
//! The prefix is the major class, chosen from the radio band booleans.

use std::fmt;

use chan_tree::{ChannelRecord, ChannelValue};

use crate::error::NamingError;

/// Major class of contact, keyed on which radio bands are used in which
/// direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorClass {
    /// UHF both ways
    UhfBidir,
    /// S-band and UHF down, UHF up
    SbandUhfBidir,
    /// S-band down only
    SbandTxo,
    /// X-band down only
    XbandTxo,
    /// X-band down, S-band up
    XbandSbandBidir,
}

/// Radio band booleans in prefix table order:
/// `(space_ground_uhf, ground_space_uhf, space_ground_sband, ground_space_sband, space_ground_xband)`
pub type BandFlags = (bool, bool, bool, bool, bool);

impl MajorClass {
    /// Every major class
    pub const ALL: [Self; 5] = [
        Self::UhfBidir,
        Self::SbandUhfBidir,
        Self::SbandTxo,
        Self::XbandTxo,
        Self::XbandSbandBidir,
    ];

    /// Name prefix
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::UhfBidir => "U_U_BIDIR",
            Self::SbandUhfBidir => "S_U_BIDIR",
            Self::SbandTxo => "S_TXO",
            Self::XbandTxo => "X_TXO",
            Self::XbandSbandBidir => "X_S_BIDIR",
        }
    }

    /// Band flags identifying this class
    #[must_use]
    pub const fn band_flags(self) -> BandFlags {
        match self {
            Self::UhfBidir => (true, true, false, false, false),
            Self::SbandUhfBidir => (true, true, true, false, false),
            Self::SbandTxo => (false, false, true, false, false),
            Self::XbandTxo => (false, false, false, false, true),
            Self::XbandSbandBidir => (false, false, false, true, true),
        }
    }

    /// Class matching the annotations' band flags, if any
    #[must_use]
    pub fn from_annotations(annos: &ChannelRecord) -> Option<Self> {
        let flags = band_flags(annos);
        Self::ALL.into_iter().find(|class| class.band_flags() == flags)
    }
}

impl fmt::Display for MajorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Read the five band booleans; missing flags count as `false`
#[must_use]
pub fn band_flags(annos: &ChannelRecord) -> BandFlags {
    (
        flag(annos, "space_ground_uhf"),
        flag(annos, "ground_space_uhf"),
        flag(annos, "space_ground_sband"),
        flag(annos, "ground_space_sband"),
        flag(annos, "space_ground_xband"),
    )
}

/// Derive the canonical channel id from classification annotations
///
/// # Errors
/// - [`NamingError::UnknownMajorClass`] if no prefix matches the band flags
/// - [`NamingError::MissingAnnotation`] if a needed bandwidth, encoding, PLS
///   or frequency is absent
pub fn class_annos_to_name(annos: &ChannelRecord) -> Result<String, NamingError> {
    let class = MajorClass::from_annotations(annos).ok_or_else(|| NamingError::UnknownMajorClass {
        annotations: ChannelValue::Object(annos.clone()).to_string(),
    })?;

    let mut name = String::from(class.prefix());
    if let Some(provider) = text(annos, "provider") {
        name.push('_');
        name.push_str(&provider);
    }
    name.push_str(&bandwidth_section(annos)?);
    name.push_str(&encoding_section(annos)?);
    name.push_str(&frequency_section(annos)?);
    if let Some(pointing) = text(annos, "adcs_pointing").filter(|p| p != "NADIR") {
        name.push('_');
        name.push_str(&pointing);
    }
    if let Some(ticket) = text(annos, "jira_ticket").filter(|t| !t.is_empty()) {
        name.push_str("_JIRA_");
        name.push_str(&ticket.replace('-', "_"));
    }
    Ok(name)
}

fn bandwidth_section(annos: &ChannelRecord) -> Result<String, NamingError> {
    let key = if flag(annos, "space_ground_sband") {
        "space_ground_sband_bandwidth_mhz"
    } else if flag(annos, "space_ground_xband") {
        "space_ground_xband_bandwidth_mhz"
    } else {
        return Ok(String::new());
    };
    Ok(format!("_BW{}", required(annos, key)?))
}

fn encoding_section(annos: &ChannelRecord) -> Result<String, NamingError> {
    if flag(annos, "space_ground_sband") {
        let encoding = required(annos, "space_ground_sband_encoding")?;
        if encoding != "DVBS2X" {
            return Ok("_LEG".to_string());
        }
        Ok(format!("_P{}", required(annos, "space_ground_sband_dvbs2x_pls")?))
    } else if flag(annos, "space_ground_xband") {
        Ok(format!("_P{}", required(annos, "space_ground_xband_dvbs2x_pls")?))
    } else {
        Ok(String::new())
    }
}

fn frequency_section(annos: &ChannelRecord) -> Result<String, NamingError> {
    if !flag(annos, "space_ground_sband") {
        return Ok(String::new());
    }
    let freq = required(annos, "space_ground_sband_mid_freq_mhz")?;
    Ok(format!("_F{}", freq.replace('.', "_")))
}

fn required(annos: &ChannelRecord, key: &str) -> Result<String, NamingError> {
    text(annos, key).ok_or_else(|| NamingError::MissingAnnotation(key.to_string()))
}

/// Boolean annotation; absent or non-boolean reads as `false`
#[must_use]
pub fn flag(annos: &ChannelRecord, key: &str) -> bool {
    annos.get(key).and_then(ChannelValue::as_bool).unwrap_or(false)
}

/// Annotation rendered as name text; `None` when absent or null
#[must_use]
pub fn text(annos: &ChannelRecord, key: &str) -> Option<String> {
    match annos.get(key)? {
        ChannelValue::Null => None,
        ChannelValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chan_test_utils::{uhf_class_annos, xband_class_annos, UHF_CHANNEL, XBAND_CHANNEL};
    use serde_json::json;

    fn annos(value: ChannelValue) -> ChannelRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn fixture_channels_are_named_consistently() {
        assert_eq!(class_annos_to_name(&annos(uhf_class_annos())).unwrap(), UHF_CHANNEL);
        assert_eq!(class_annos_to_name(&annos(xband_class_annos())).unwrap(), XBAND_CHANNEL);
    }

    #[test]
    fn sband_dvbs2x_with_every_section() {
        let a = annos(json!({
            "space_ground_uhf": true,
            "ground_space_uhf": true,
            "space_ground_sband": true,
            "ground_space_sband": false,
            "space_ground_xband": false,
            "provider": "SPIRE",
            "space_ground_sband_bandwidth_mhz": 5,
            "space_ground_sband_encoding": "DVBS2X",
            "space_ground_sband_dvbs2x_pls": 39,
            "space_ground_sband_mid_freq_mhz": 2245.5,
            "adcs_pointing": "HALFTRACK",
            "jira_ticket": "OPS-123"
        }));
        assert_eq!(
            class_annos_to_name(&a).unwrap(),
            "S_U_BIDIR_SPIRE_BW5_P39_F2245_5_HALFTRACK_JIRA_OPS_123"
        );
    }

    #[test]
    fn sband_legacy_encoding() {
        let a = annos(json!({
            "space_ground_sband": true,
            "provider": "KSAT",
            "space_ground_sband_bandwidth_mhz": 2.5,
            "space_ground_sband_encoding": "LEGACY",
            "space_ground_sband_mid_freq_mhz": 2200,
            "adcs_pointing": "NADIR"
        }));
        assert_eq!(class_annos_to_name(&a).unwrap(), "S_TXO_KSAT_BW2.5_LEG_F2200");
    }

    #[test]
    fn xband_sband_bidir() {
        let a = annos(json!({
            "ground_space_sband": true,
            "space_ground_xband": true,
            "space_ground_xband_bandwidth_mhz": 100,
            "space_ground_xband_dvbs2x_pls": 7
        }));
        assert_eq!(class_annos_to_name(&a).unwrap(), "X_S_BIDIR_BW100_P7");
    }

    #[test]
    fn unknown_band_combination() {
        let a = annos(json!({"space_ground_uhf": true}));
        assert!(matches!(
            class_annos_to_name(&a),
            Err(NamingError::UnknownMajorClass { .. })
        ));
    }

    #[test]
    fn missing_pls_is_reported() {
        let a = annos(json!({"space_ground_xband": true, "space_ground_xband_bandwidth_mhz": 20}));
        assert_eq!(
            class_annos_to_name(&a),
            Err(NamingError::MissingAnnotation("space_ground_xband_dvbs2x_pls".to_string()))
        );
    }

    #[test]
    fn major_class_round_trip() {
        for class in MajorClass::ALL {
            let (sg_uhf, gs_uhf, sg_s, gs_s, sg_x) = class.band_flags();
            let a = annos(json!({
                "space_ground_uhf": sg_uhf,
                "ground_space_uhf": gs_uhf,
                "space_ground_sband": sg_s,
                "ground_space_sband": gs_s,
                "space_ground_xband": sg_x,
            }));
            assert_eq!(MajorClass::from_annotations(&a), Some(class));
        }
    }
}
