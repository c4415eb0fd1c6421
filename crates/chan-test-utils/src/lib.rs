//! Testing utilities for the channel tool workspace
//!
//! Sample channel definitions, a JSON schema set, and a temporary data
//! directory laid out the way the store expects.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

pub const UHF_CHANNEL: &str = "U_U_BIDIR_SPIRE";
pub const XBAND_CHANNEL: &str = "X_TXO_SPIRE_BW20_P5";
pub const GROUND_STATION: &str = "sydney-gs";
pub const SATELLITE: &str = "FM101";

pub const SCHEMA_YAML: &str = r"
gs_schema:
  type: object
  required: [enabled, legal, directionality]
  additionalProperties: false
  properties:
    enabled: {type: boolean}
    legal: {type: boolean}
    directionality: {enum: [Bidirectional, SpaceToEarth, EarthToSpace]}
    contact_type: {type: string}
    allowed_license_countries: {type: array, items: {type: string}}
    contact_overhead_time: {type: string}
    classification_annotations: {type: object}
    link_profile: {type: array, items: {type: object}}
    window_parameters: {type: object}
    dynamic_window_parameters: {type: object}
    ground_station_constraints: {type: object}
sat_schema:
  type: object
  required: [enabled, legal, directionality]
  additionalProperties: false
  properties:
    enabled: {type: boolean}
    legal: {type: boolean}
    directionality: {enum: [Bidirectional, SpaceToEarth, EarthToSpace]}
    contact_type: {type: string}
    allowed_license_countries: {type: array, items: {type: string}}
    contact_overhead_time: {type: string}
    classification_annotations: {type: object}
    window_parameters: {type: object}
    dynamic_window_parameters: {type: object}
    satellite_constraints: {type: object}
shared_separation_constraint_sets_schema:
  type: array
  items:
    type: object
    required: [type]
    properties:
      type: {type: string}
";

pub fn uhf_class_annos() -> Value {
    json!({
        "adcs_pointing": "NADIR",
        "directionality": "BIDIR",
        "ground_space_sband": false,
        "ground_space_uhf": true,
        "provider": "SPIRE",
        "space_ground_sband": false,
        "space_ground_uhf": true,
        "space_ground_xband": false
    })
}

pub fn xband_class_annos() -> Value {
    json!({
        "adcs_pointing": "NADIR",
        "directionality": "TXO",
        "ground_space_sband": false,
        "ground_space_uhf": false,
        "provider": "SPIRE",
        "space_ground_sband": false,
        "space_ground_uhf": false,
        "space_ground_xband": true,
        "space_ground_xband_bandwidth_mhz": 20,
        "space_ground_xband_dvbs2x_pls": 5
    })
}

pub fn gs_uhf_record(enabled: bool) -> Value {
    json!({
        "allowed_license_countries": [],
        "classification_annotations": uhf_class_annos(),
        "contact_overhead_time": "10s",
        "contact_type": "UHF_BIDIR",
        "directionality": "Bidirectional",
        "enabled": enabled,
        "legal": enabled,
        "link_profile": [
            {"downlink_rate_kbps": 9.6, "min_elevation_deg": 10, "uplink_rate_kbps": 9.6}
        ]
    })
}

pub fn gs_xband_record(enabled: bool) -> Value {
    json!({
        "allowed_license_countries": [],
        "classification_annotations": xband_class_annos(),
        "contact_overhead_time": "10s",
        "contact_type": "XBAND_TXO",
        "directionality": "SpaceToEarth",
        "enabled": enabled,
        "legal": enabled,
        "link_profile": [
            {"downlink_rate_kbps": 50000, "min_elevation_deg": 15}
        ],
        "window_parameters": {
            "forward_channels": [
                {"bandaid_override": {"pls": 5}, "radio_band": "XBAND"}
            ]
        }
    })
}

pub fn sat_uhf_record(enabled: bool) -> Value {
    json!({
        "allowed_license_countries": [],
        "contact_type": "UHF_BIDIR",
        "directionality": "Bidirectional",
        "enabled": enabled,
        "legal": enabled
    })
}

pub fn sat_xband_record(enabled: bool) -> Value {
    json!({
        "allowed_license_countries": [],
        "contact_type": "XBAND_TXO",
        "directionality": "SpaceToEarth",
        "enabled": enabled,
        "legal": enabled,
        "window_parameters": {
            "forward_channels": [{"radio_band": "XBAND"}]
        }
    })
}

pub fn gs_templates() -> Value {
    json!({
        UHF_CHANNEL: gs_uhf_record(false),
        XBAND_CHANNEL: gs_xband_record(false),
    })
}

pub fn sat_templates() -> Value {
    json!({
        UHF_CHANNEL: sat_uhf_record(false),
        XBAND_CHANNEL: sat_xband_record(false),
    })
}

pub fn with_field(mut record: Value, field: &str, value: Value) -> Value {
    record
        .as_object_mut()
        .expect("fixture records are mappings")
        .insert(field.to_string(), value);
    record
}

/// Temporary data directory with templates, schema and per-environment
/// asset folders.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Empty directory with only the schema and templates
    pub fn new() -> Self {
        let workspace = Self {
            dir: TempDir::new().expect("create temp dir"),
        };
        workspace.write("schema.yaml", SCHEMA_YAML);
        workspace.write_yaml("gs_templates.yaml", &gs_templates());
        workspace.write_yaml("sat_templates.yaml", &sat_templates());
        for env in ["staging", "production"] {
            fs::create_dir_all(workspace.path(&format!("{env}/gs"))).expect("create gs dir");
            fs::create_dir_all(workspace.path(&format!("{env}/sat"))).expect("create sat dir");
        }
        workspace
    }

    /// Workspace with one ground station and one satellite in staging, both
    /// configured for every template channel
    pub fn standard() -> Self {
        let workspace = Self::new();
        workspace.write_yaml(
            &format!("staging/gs/{GROUND_STATION}.yaml"),
            &json!({
                UHF_CHANNEL: with_field(gs_uhf_record(true), "allowed_license_countries", json!(["AU", "US"])),
                XBAND_CHANNEL: with_field(gs_xband_record(true), "allowed_license_countries", json!(["AU", "US"])),
            }),
        );
        workspace.write_yaml(
            &format!("staging/sat/{SATELLITE}.yaml"),
            &json!({
                UHF_CHANNEL: with_field(sat_uhf_record(true), "allowed_license_countries", json!(["AU"])),
                XBAND_CHANNEL: with_field(sat_xband_record(true), "allowed_license_countries", json!(["AU"])),
            }),
        );
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    pub fn write_yaml(&self, relative: &str, value: &Value) {
        let text = serde_yaml::to_string(value).expect("serialize fixture");
        self.write(relative, &text);
    }

    pub fn read_yaml(&self, relative: &str) -> Value {
        let text = fs::read_to_string(self.path(relative)).expect("read fixture file");
        serde_yaml::from_str(&text).expect("parse fixture yaml")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
