//! Inventory service lookups
//!
//! The inventory service knows each asset's license country and ids. Lookups
//! are `GET <base>/<kind>/<id>` and are cached for the lifetime of the
//! client.

use std::collections::HashMap;
use std::time::Duration;

use chan_rules::{AssetKind, Environment};
use chan_tree::ChannelValue;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::InventoryConfig;
use crate::error::{StoreError, StoreResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields of an inventory record the tool reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryAsset {
    /// ISO country code, possibly with a subdivision suffix
    #[serde(default)]
    pub license_country: String,
    /// Satellite id as used in ground station deny lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spire_id: Option<ChannelValue>,
    /// Ground station id as used in satellite deny lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gs_id: Option<ChannelValue>,
}

impl InventoryAsset {
    /// Record with only a license country
    #[must_use]
    pub fn licensed_in(country: impl Into<String>) -> Self {
        Self {
            license_country: country.into(),
            ..Self::default()
        }
    }
}

/// Source of inventory records
pub trait Inventory {
    /// Look up one asset
    ///
    /// # Errors
    /// [`StoreError::Inventory`] when the lookup fails.
    fn asset(&mut self, env: Environment, kind: AssetKind, id: &str) -> StoreResult<InventoryAsset>;
}

/// Path segment of an asset kind in inventory URLs
#[must_use]
pub const fn kind_segment(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::GroundStation => "groundstation",
        AssetKind::Satellite => "satellite",
    }
}

/// Blocking HTTP client with a per-run cache
#[derive(Debug)]
pub struct InventoryClient {
    client: Client,
    urls: InventoryConfig,
    cache: HashMap<(Environment, AssetKind, String), InventoryAsset>,
}

impl InventoryClient {
    /// Client for the configured base URLs
    ///
    /// # Errors
    /// [`StoreError::Inventory`] if the HTTP client cannot be built.
    pub fn new(urls: InventoryConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| StoreError::Inventory {
                url: "<client>".to_string(),
                source,
            })?;
        Ok(Self {
            client,
            urls,
            cache: HashMap::new(),
        })
    }

    /// URL of one asset record
    #[must_use]
    pub fn url(&self, env: Environment, kind: AssetKind, id: &str) -> String {
        let base = self.urls.base_url(env);
        let separator = if base.ends_with('/') { "" } else { "/" };
        format!("{base}{separator}{}/{id}", kind_segment(kind))
    }

    fn fetch(&self, url: &str) -> Result<InventoryAsset, reqwest::Error> {
        self.client.get(url).send()?.error_for_status()?.json()
    }
}

impl Inventory for InventoryClient {
    fn asset(&mut self, env: Environment, kind: AssetKind, id: &str) -> StoreResult<InventoryAsset> {
        let key = (env, kind, id.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }
        let url = self.url(env, kind, id);
        tracing::debug!(%url, "fetching inventory record");
        let asset = self.fetch(&url).map_err(|source| StoreError::Inventory { url, source })?;
        self.cache.insert(key, asset.clone());
        Ok(asset)
    }
}

/// Inventory held in memory, for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    assets: HashMap<(AssetKind, String), InventoryAsset>,
}

impl StaticInventory {
    /// Inventory with no assets
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, kind inferred from the id
    #[must_use]
    pub fn with_asset(mut self, id: &str, asset: InventoryAsset) -> Self {
        self.assets.insert((AssetKind::infer(id), id.to_string()), asset);
        self
    }
}

impl Inventory for StaticInventory {
    fn asset(&mut self, _: Environment, kind: AssetKind, id: &str) -> StoreResult<InventoryAsset> {
        // Unknown assets have no license country, so every channel is rejected.
        Ok(self
            .assets
            .get(&(kind, id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn urls_join_base_kind_and_id() {
        let client = InventoryClient::new(InventoryConfig {
            staging: "http://inv/v2".to_string(),
            production: "http://prod/v2/".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.url(Environment::Staging, AssetKind::GroundStation, "sydney-gs"),
            "http://inv/v2/groundstation/sydney-gs"
        );
        assert_eq!(
            client.url(Environment::Production, AssetKind::Satellite, "FM101"),
            "http://prod/v2/satellite/FM101"
        );
    }

    #[test]
    fn records_ignore_unknown_fields() {
        let asset: InventoryAsset =
            serde_json::from_value(json!({"license_country": "AU-NSW", "spire_id": "FM101", "name": "x"})).unwrap();
        assert_eq!(asset.license_country, "AU-NSW");
        assert_eq!(asset.spire_id, Some(json!("FM101")));
        assert_eq!(asset.gs_id, None);
    }

    #[test]
    fn static_inventory_lookup() {
        let mut inventory = StaticInventory::new().with_asset("FM101", InventoryAsset::licensed_in("AU"));
        assert_eq!(
            inventory
                .asset(Environment::Staging, AssetKind::Satellite, "FM101")
                .unwrap()
                .license_country,
            "AU"
        );
        assert_eq!(
            inventory
                .asset(Environment::Staging, AssetKind::GroundStation, "nowhere-gs")
                .unwrap(),
            InventoryAsset::default()
        );
    }
}
