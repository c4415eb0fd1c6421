//! Store behaviour against a temporary data directory

use chan_rules::{AssetKind, Environment};
use chan_store::{AssetSelector, ChannelStore, StoreError};
use chan_test_utils::{gs_templates, TestWorkspace, GROUND_STATION, SATELLITE, UHF_CHANNEL, XBAND_CHANNEL};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn saved_config_reads_back_sorted() {
    let ws = TestWorkspace::standard();
    let mut store = ChannelStore::open(ws.root());
    let env = Environment::Staging;

    let mut config = store.load_asset(env, GROUND_STATION).unwrap();
    config.remove(UHF_CHANNEL);
    config.insert("A_FIRST".to_string(), json!(null));
    store.save_asset(env, GROUND_STATION, &config).unwrap();

    let mut fresh = ChannelStore::open(ws.root());
    let keys: Vec<String> = fresh.load_asset(env, GROUND_STATION).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["A_FIRST".to_string(), XBAND_CHANNEL.to_string()]);
}

#[test]
fn cache_serves_repeat_loads() {
    let ws = TestWorkspace::standard();
    let mut store = ChannelStore::open(ws.root());
    let env = Environment::Staging;

    let first = store.load_asset(env, SATELLITE).unwrap();
    std::fs::remove_file(ws.path(&format!("staging/sat/{SATELLITE}.yaml"))).unwrap();
    assert_eq!(store.load_asset(env, SATELLITE).unwrap(), first);
    assert_eq!(store.cache().len(), 1);
}

#[test]
fn non_mapping_config_is_rejected() {
    let ws = TestWorkspace::new();
    ws.write("staging/sat/FM5.yaml", "- just\n- a list\n");
    let mut store = ChannelStore::open(ws.root());
    let err = store.load_asset(Environment::Staging, "FM5").unwrap_err();
    assert!(matches!(err, StoreError::NotAMapping { found: "sequence", .. }));
}

#[test]
fn shared_template_file_is_the_fallback() {
    let ws = TestWorkspace::new();
    std::fs::remove_file(ws.path("gs_templates.yaml")).unwrap();
    ws.write_yaml("templates.yaml", &gs_templates());
    let store = ChannelStore::open(ws.root());

    assert_eq!(store.layout().template_file_name(AssetKind::GroundStation), "templates.yaml");
    assert_eq!(store.layout().template_file_name(AssetKind::Satellite), "sat_templates.yaml");
    assert!(store.template(AssetKind::GroundStation, XBAND_CHANNEL).is_ok());
}

#[test]
fn kind_selectors_list_sorted_ids() {
    let ws = TestWorkspace::standard();
    ws.write_yaml("staging/gs/alpha-gs.yaml", &json!({}));
    ws.write("staging/gs/README.md", "not a config");
    let store = ChannelStore::open(ws.root());

    assert_eq!(
        store
            .locate_assets(Environment::Staging, &AssetSelector::AllOfKind(AssetKind::GroundStation))
            .unwrap(),
        vec!["alpha-gs".to_string(), GROUND_STATION.to_string()]
    );
    assert!(store
        .locate_assets(Environment::Production, &AssetSelector::All)
        .unwrap()
        .is_empty());
}

#[test]
fn templates_save_sorted() {
    let ws = TestWorkspace::new();
    let store = ChannelStore::open(ws.root());
    let mut templates = store.templates(AssetKind::Satellite).unwrap();
    templates.insert("A_NEW".to_string(), json!({"enabled": false}));
    store.save_templates(AssetKind::Satellite, &templates).unwrap();

    let keys: Vec<String> = store.templates(AssetKind::Satellite).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["A_NEW", UHF_CHANNEL, XBAND_CHANNEL]);
}
