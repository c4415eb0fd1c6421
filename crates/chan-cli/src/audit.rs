//! Channel audit of satellite / ground station pairs
//!
//! A channel is usable for a pair when both sides configure it, both mark it
//! legal and enabled, their contact types and directionality agree, each
//! side's license country is allowed by the other, and neither deny list
//! names the other asset. Usable channels are annotated by a fixed set of
//! inspections.

use std::fmt;

use chan_rules::AssetConfig;
use chan_store::{yaml, InventoryAsset};
use chan_tree::{is_truthy, lookup, ChannelRecord, ChannelValue};

use crate::table::Table;

fn field<'a>(record: &'a ChannelRecord, key: &str) -> Option<&'a ChannelValue> {
    record.get(key).filter(|v| !v.is_null())
}

fn flag(record: &ChannelRecord, key: &str) -> bool {
    record.get(key).is_some_and(is_truthy)
}

fn text(value: Option<&ChannelValue>) -> String {
    match value {
        None | Some(ChannelValue::Null) => "None".to_string(),
        Some(ChannelValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `[a, b]` rendering of a list value
fn list_text(value: Option<&ChannelValue>) -> String {
    match value {
        Some(ChannelValue::Array(items)) => {
            let items: Vec<String> = items.iter().map(|v| text(Some(v))).collect();
            format!("[{}]", items.join(", "))
        }
        other => text(other),
    }
}

fn contains(list: Option<&ChannelValue>, needle: &ChannelValue) -> bool {
    list.and_then(ChannelValue::as_array)
        .is_some_and(|items| items.contains(needle))
}

/// Why a channel cannot be used between two assets, if it cannot
#[must_use]
pub fn rejection_reason(
    satellite: &InventoryAsset,
    ground_station: &InventoryAsset,
    sat_chan: Option<&ChannelRecord>,
    gs_chan: Option<&ChannelRecord>,
) -> Option<String> {
    let Some(gs_chan) = gs_chan else {
        return Some("Channel not configured on ground station".to_string());
    };
    let Some(sat_chan) = sat_chan else {
        return Some("Channel not configured on satellite".to_string());
    };

    if !flag(sat_chan, "legal") {
        return Some("Channel marked illegal on satellite".to_string());
    }
    if !flag(gs_chan, "legal") {
        return Some("Channel marked illegal on ground station".to_string());
    }
    if !flag(sat_chan, "enabled") {
        return Some("Channel disabled on satellite".to_string());
    }
    if !flag(gs_chan, "enabled") {
        return Some("Channel disabled on ground station".to_string());
    }

    let sat_type = sat_chan.get("contact_type").filter(|v| is_truthy(v));
    let gs_type = gs_chan.get("contact_type").filter(|v| is_truthy(v));
    if let (Some(sat_type), Some(gs_type)) = (sat_type, gs_type) {
        if sat_type != gs_type {
            return Some(format!(
                "Contact type mismatch ({} vs {})",
                text(Some(sat_type)),
                text(Some(gs_type))
            ));
        }
    }

    let sat_dir = sat_chan.get("directionality");
    let gs_dir = gs_chan.get("directionality");
    if sat_dir != gs_dir {
        return Some(format!("Directionality mismatch ({} vs {})", text(sat_dir), text(gs_dir)));
    }

    let sat_countries = sat_chan.get("allowed_license_countries");
    let gs_countries = gs_chan.get("allowed_license_countries");
    let sat_country: String = satellite.license_country.chars().take(2).collect();
    let gs_country = &ground_station.license_country;

    if !contains(gs_countries, &ChannelValue::String(sat_country.clone())) {
        return Some(format!(
            "Satellite license country {sat_country} not in set {}",
            list_text(gs_countries)
        ));
    }
    if !contains(sat_countries, &ChannelValue::String(gs_country.clone())) {
        return Some(format!(
            "Ground station license country {gs_country} not in set {}",
            list_text(sat_countries)
        ));
    }

    let sat_value = ChannelValue::Object(sat_chan.clone());
    let gs_value = ChannelValue::Object(gs_chan.clone());
    let denied_sats = lookup("ground_station_constraints.deny_satellites", &gs_value);
    let denied_gss = lookup("satellite_constraints.deny_ground_stations", &sat_value);

    if satellite.spire_id.as_ref().is_some_and(|id| contains(denied_sats, id)) {
        return Some("Satellite in ground station deny list".to_string());
    }
    if ground_station.gs_id.as_ref().is_some_and(|id| contains(denied_gss, id)) {
        return Some("Ground station in satellite deny list".to_string());
    }
    None
}

/// Merge satellite and GS window parameters the way the scheduler does
///
/// Satellite values win for matching scalars, lists merge element-wise, and
/// mappings merge key-wise with satellite keys first. A missing satellite
/// value takes the GS value.
#[must_use]
pub fn merge_static_parameters(sat: Option<&ChannelValue>, gs: Option<&ChannelValue>) -> ChannelValue {
    let sat = sat.filter(|v| !v.is_null());
    match (sat, gs) {
        (None, gs) => gs.cloned().unwrap_or(ChannelValue::Null),
        (Some(ChannelValue::Array(sat_items)), Some(ChannelValue::Array(gs_items))) => {
            let len = sat_items.len().max(gs_items.len());
            ChannelValue::Array(
                (0..len)
                    .map(|i| merge_static_parameters(sat_items.get(i), gs_items.get(i)))
                    .collect(),
            )
        }
        (Some(ChannelValue::Object(sat_fields)), Some(ChannelValue::Object(gs_fields))) => {
            let mut merged = ChannelRecord::new();
            for key in sat_fields.keys().chain(gs_fields.keys()) {
                if !merged.contains_key(key) {
                    merged.insert(
                        key.clone(),
                        merge_static_parameters(sat_fields.get(key), gs_fields.get(key)),
                    );
                }
            }
            ChannelValue::Object(merged)
        }
        (Some(sat), _) => sat.clone(),
    }
}

/// Annotation computed for each usable channel
pub trait Inspection {
    /// Column header
    fn header(&self) -> &'static str;

    /// Cell text for a usable channel
    fn apply(&self, sat_chan: &ChannelRecord, gs_chan: &ChannelRecord) -> String;
}

/// Flags channels restricted by satellite constraints
#[derive(Debug, Clone, Copy, Default)]
pub struct SatelliteConstraintInspection;

impl Inspection for SatelliteConstraintInspection {
    fn header(&self) -> &'static str {
        "Constraints"
    }

    fn apply(&self, sat_chan: &ChannelRecord, _: &ChannelRecord) -> String {
        if field(sat_chan, "satellite_constraints").is_some() {
            "Note: Subject to satellite constraints".to_string()
        } else {
            String::new()
        }
    }
}

/// Shows the window parameters the scheduler would use
#[derive(Debug, Clone, Copy, Default)]
pub struct MergedParametersInspection;

impl Inspection for MergedParametersInspection {
    fn header(&self) -> &'static str {
        "Merged Parameters"
    }

    fn apply(&self, sat_chan: &ChannelRecord, gs_chan: &ChannelRecord) -> String {
        let empty = ChannelValue::Object(ChannelRecord::new());
        let sat = sat_chan.get("window_parameters").unwrap_or(&empty);
        let gs = gs_chan.get("window_parameters").unwrap_or(&empty);
        let merged = merge_static_parameters(Some(sat), Some(gs));
        yaml::dump(&merged).unwrap_or_else(|_| merged.to_string())
    }
}

/// Shows the contact type the pair ends up with
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactTypeInspection;

impl Inspection for ContactTypeInspection {
    fn header(&self) -> &'static str {
        "Contact Type"
    }

    fn apply(&self, sat_chan: &ChannelRecord, gs_chan: &ChannelRecord) -> String {
        let sat = sat_chan.get("contact_type").filter(|v| is_truthy(v));
        let gs = gs_chan.get("contact_type").filter(|v| is_truthy(v));
        match (sat, gs) {
            (None, None) => "<default>".to_string(),
            (Some(only), None) | (None, Some(only)) => text(Some(only)),
            (Some(sat), Some(gs)) if sat == gs => text(Some(gs)),
            _ => "Contact type mismatch!".to_string(),
        }
    }
}

/// Inspections run by default, in column order
#[must_use]
pub fn default_inspections() -> Vec<Box<dyn Inspection>> {
    vec![
        Box::new(SatelliteConstraintInspection),
        Box::new(MergedParametersInspection),
        Box::new(ContactTypeInspection),
    ]
}

/// Usable and rejected channels of one satellite / GS pair
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Satellite of the pair
    pub sat_id: String,
    /// Ground station of the pair
    pub gs_id: String,
    headers: Vec<&'static str>,
    /// Channel id followed by one cell per inspection, sorted
    pub shared: Vec<Vec<String>>,
    /// (channel id, reason), sorted
    pub rejected: Vec<(String, String)>,
}

impl AuditReport {
    /// Compare the configs of a pair
    #[must_use]
    pub fn build(
        sat_id: &str,
        gs_id: &str,
        sat_config: &AssetConfig,
        gs_config: &AssetConfig,
        satellite: &InventoryAsset,
        ground_station: &InventoryAsset,
        inspections: &[Box<dyn Inspection>],
    ) -> Self {
        let mut channels: Vec<&String> = sat_config.keys().collect();
        channels.extend(gs_config.keys().filter(|k| !sat_config.contains_key(*k)));

        let mut shared = Vec::new();
        let mut rejected = Vec::new();
        for channel in channels {
            let sat_chan = sat_config.get(channel).and_then(ChannelValue::as_object);
            let gs_chan = gs_config.get(channel).and_then(ChannelValue::as_object);
            match (rejection_reason(satellite, ground_station, sat_chan, gs_chan), sat_chan, gs_chan) {
                (None, Some(sat_chan), Some(gs_chan)) => {
                    let mut row = vec![channel.clone()];
                    row.extend(inspections.iter().map(|i| i.apply(sat_chan, gs_chan)));
                    shared.push(row);
                }
                (reason, _, _) => rejected.push((channel.clone(), reason.unwrap_or_default())),
            }
        }
        shared.sort();
        rejected.sort();

        Self {
            sat_id: sat_id.to_string(),
            gs_id: gs_id.to_string(),
            headers: inspections.iter().map(|i| i.header()).collect(),
            shared,
            rejected,
        }
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Audit summary for {} -> {}", self.sat_id, self.gs_id);
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f)?;

        writeln!(f, "Valid Channels")?;
        writeln!(f)?;
        if self.shared.is_empty() {
            writeln!(f, "(No channels passed licensing rules)")?;
        } else {
            let mut table = Table::new(std::iter::once("Channel").chain(self.headers.iter().copied()));
            for row in &self.shared {
                table.push(row.clone());
            }
            write!(f, "{table}")?;
        }
        writeln!(f)?;

        writeln!(f, "Rejected Channels")?;
        writeln!(f)?;
        let mut table = Table::new(["Channel", "Reason"]);
        for (channel, reason) in &self.rejected {
            table.push(vec![channel.clone(), reason.clone()]);
        }
        write!(f, "{table}")
    }
}
