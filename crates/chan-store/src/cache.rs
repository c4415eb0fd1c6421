//! Per-run asset config cache
//!
//! One cache lives for one command invocation. Nothing is persisted and
//! nothing expires; writes through the store refresh the entry and deleting
//! a config file drops it.

use std::collections::HashMap;

use chan_rules::{AssetConfig, Environment};

/// Asset configs keyed by (environment, asset id)
#[derive(Debug, Clone, Default)]
pub struct ConfigCache {
    entries: HashMap<(Environment, String), AssetConfig>,
}

impl ConfigCache {
    /// Empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached config of one asset
    #[must_use]
    pub fn get(&self, env: Environment, asset: &str) -> Option<&AssetConfig> {
        self.entries.get(&(env, asset.to_string()))
    }

    /// Store or replace the config of one asset
    pub fn insert(&mut self, env: Environment, asset: &str, config: AssetConfig) {
        self.entries.insert((env, asset.to_string()), config);
    }

    /// Drop one entry, returning it if present
    pub fn invalidate(&mut self, env: Environment, asset: &str) -> Option<AssetConfig> {
        self.entries.remove(&(env, asset.to_string()))
    }

    /// Number of cached configs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyed_by_environment_and_asset() {
        let mut cache = ConfigCache::new();
        let config = json!({"A": null}).as_object().unwrap().clone();
        cache.insert(Environment::Staging, "FM1", config.clone());

        assert_eq!(cache.get(Environment::Staging, "FM1"), Some(&config));
        assert_eq!(cache.get(Environment::Production, "FM1"), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.invalidate(Environment::Staging, "FM1"), Some(config));
        assert!(cache.is_empty());
    }
}
