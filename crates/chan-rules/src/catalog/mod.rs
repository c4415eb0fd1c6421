//! Built-in rule catalog
//!
//! Rules are grouped into dotted modules (`scheduling.link_profiles`,
//! `regulatory.xband`, ...). Each module file exposes a `register` function
//! adding its rules to a [`RuleRegistry`].
//!
//! Rules never panic on malformed channel records: a missing field either
//! passes (when the rule does not apply) or fails with a reason.

mod constpipe;
mod regulatory;
mod scheduling;

use chan_tree::{is_truthy, ChannelRecord, ChannelValue};

use crate::registry::RuleRegistry;

/// Register every built-in rule
pub(crate) fn register_all(registry: &mut RuleRegistry) {
    scheduling::register(registry);
    regulatory::register(registry);
    constpipe::register(registry);
    tracing::debug!(rules = registry.len(), "registered built-in rule catalog");
}

/// Walk nested mappings; `None` when any step is missing or the leaf is null
pub(crate) fn nested<'a>(record: &'a ChannelRecord, path: &[&str]) -> Option<&'a ChannelValue> {
    let (first, rest) = path.split_first()?;
    let mut value = record.get(*first)?;
    for key in rest {
        value = value.as_object()?.get(*key)?;
    }
    (!value.is_null()).then_some(value)
}

/// Whether `record[key]` is present and truthy
pub(crate) fn truthy(record: &ChannelRecord, key: &str) -> bool {
    record.get(key).is_some_and(is_truthy)
}

/// String field, if present
pub(crate) fn str_field<'a>(record: &'a ChannelRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(ChannelValue::as_str)
}

/// Mapping items of a sequence value; non-mapping items are skipped
pub(crate) fn mappings(value: Option<&ChannelValue>) -> Vec<&ChannelRecord> {
    value
        .and_then(ChannelValue::as_array)
        .map(|items| items.iter().filter_map(ChannelValue::as_object).collect())
        .unwrap_or_default()
}

/// Equality treating `5` and `5.0` as the same number
pub(crate) fn same_value(a: &ChannelValue, b: &ChannelValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => a == b,
    }
}

/// Value rendered for a failure reason
pub(crate) fn render(value: Option<&ChannelValue>) -> String {
    match value {
        None | Some(ChannelValue::Null) => "null".to_string(),
        Some(ChannelValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `[a, b, c]`
pub(crate) fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(", "))
}

#[cfg(test)]
pub(crate) fn record(value: ChannelValue) -> ChannelRecord {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_treats_null_as_missing() {
        let r = record(json!({"a": {"b": null, "c": 1}}));
        assert_eq!(nested(&r, &["a", "c"]), Some(&json!(1)));
        assert_eq!(nested(&r, &["a", "b"]), None);
        assert_eq!(nested(&r, &["a", "x"]), None);
        assert_eq!(nested(&r, &["a", "c", "d"]), None);
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(same_value(&json!(5), &json!(5.0)));
        assert!(!same_value(&json!(5), &json!("5")));
        assert!(same_value(&json!("x"), &json!("x")));
    }

    #[test]
    fn rendering() {
        assert_eq!(render(None), "null");
        assert_eq!(render(Some(&json!("UHF"))), "UHF");
        assert_eq!(render(Some(&json!(39))), "39");
        assert_eq!(render_list(&["UHF", "SBAND"]), "[UHF, SBAND]");
    }

    #[test]
    fn every_module_registers() {
        let registry = RuleRegistry::with_defaults();
        let modules = registry.modules();
        for expected in [
            "scheduling.channel_naming",
            "scheduling.template_channels_enable_legal_flags",
            "scheduling.gs_class_annos",
            "scheduling.gs_template_class_annos",
            "scheduling.link_profiles",
            "scheduling.sband_bidirs",
            "scheduling.window_params",
            "scheduling.shared_separation_constraint_sets",
            "scheduling.interval_charge_constraint",
            "scheduling.halftrack_consistency",
            "scheduling.gs_provider_validation",
            "regulatory.xband",
            "regulatory.sband",
            "constpipe.pls_consistency",
            "constpipe.radio_band_consistency",
            "constpipe.adcs_config_consistency",
            "constpipe.otc_p1_lsc_consistency",
        ] {
            assert!(modules.contains(&expected), "missing module {expected}");
        }
    }
}
