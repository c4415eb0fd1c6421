//! Tool configuration
//!
//! An optional `channel-tool.toml`:
//!
//! ```toml
//! root = "/srv/channels"
//! environments = ["staging", "production"]
//!
//! [inventory]
//! staging = "https://theknowledge.staging.spire.sh/v2/"
//! production = "https://theknowledge.cloud.spire.com/v2/"
//! ```
//!
//! `CHANNEL_TOOL_ROOT` and `CHANNEL_TOOL_INVENTORY_<ENV>` override the file.

use std::path::{Path, PathBuf};

use chan_rules::Environment;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Default configuration file name, looked up in the data root
pub const CONFIG_FILE: &str = "channel-tool.toml";
/// Environment variable overriding the data root
pub const ROOT_ENV_VAR: &str = "CHANNEL_TOOL_ROOT";
/// Prefix of the per-environment inventory URL variables
pub const INVENTORY_ENV_PREFIX: &str = "CHANNEL_TOOL_INVENTORY_";

/// Inventory service base URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InventoryConfig {
    /// Staging base URL
    pub staging: String,
    /// Production base URL
    pub production: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            staging: "https://theknowledge.staging.spire.sh/v2/".to_string(),
            production: "https://theknowledge.cloud.spire.com/v2/".to_string(),
        }
    }
}

impl InventoryConfig {
    /// Base URL for an environment
    #[must_use]
    pub fn base_url(&self, env: Environment) -> &str {
        match env {
            Environment::Staging => &self.staging,
            Environment::Production => &self.production,
        }
    }

    fn base_url_mut(&mut self, env: Environment) -> &mut String {
        match env {
            Environment::Staging => &mut self.staging,
            Environment::Production => &mut self.production,
        }
    }
}

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Data directory; the working directory when unset
    pub root: Option<PathBuf>,
    /// Environments `validate` walks by default
    pub environments: Vec<Environment>,
    /// Inventory service endpoints
    pub inventory: InventoryConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            root: None,
            environments: Environment::ALL.to_vec(),
            inventory: InventoryConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Parse TOML text read from `path`
    ///
    /// # Errors
    /// [`StoreError::Config`] when the text is not a valid configuration.
    pub fn from_toml(path: &Path, text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|err| StoreError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load a configuration file
    ///
    /// # Errors
    /// IO errors, including a missing file, and parse errors.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
        let config = Self::from_toml(path, &text)?;
        tracing::debug!(path = %path.display(), "loaded tool configuration");
        Ok(config)
    }

    /// Load `explicit` if given, else `<dir>/channel-tool.toml` if present,
    /// else defaults
    ///
    /// # Errors
    /// See [`ToolConfig::load`].
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> StoreResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides read through `lookup`
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            self.root = Some(PathBuf::from(root));
        }
        for env in Environment::ALL {
            let name = format!("{INVENTORY_ENV_PREFIX}{}", env.as_str().to_ascii_uppercase());
            if let Some(url) = lookup(&name).filter(|v| !v.is_empty()) {
                *self.inventory.base_url_mut(env) = url;
            }
        }
        self
    }

    /// Data root, or `fallback` when none is configured
    #[must_use]
    pub fn data_root(&self, fallback: &Path) -> PathBuf {
        self.root.clone().unwrap_or_else(|| fallback.to_path_buf())
    }
}
