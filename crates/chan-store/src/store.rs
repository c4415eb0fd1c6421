//! Channel config, template and schema store

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chan_rules::{AssetConfig, AssetKind, Environment, SchemaSet};
use chan_tree::{ChannelRecord, ChannelValue};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::cache::ConfigCache;
use crate::error::{StoreError, StoreResult};
use crate::layout::Layout;
use crate::selector::{split_list, AssetSelector, ChannelSelector};
use crate::yaml;

/// One shared separation constraint set file
#[derive(Debug, Clone, PartialEq)]
pub struct SharedSet {
    /// File stem, the name constraints reference
    pub name: String,
    /// Path of the set file
    pub file: PathBuf,
    /// Parsed contents
    pub document: ChannelValue,
}

/// `contact_type_defs.yaml`
#[derive(Debug, Default, serde::Deserialize)]
struct ContactTypeDefs {
    #[serde(default)]
    groups: IndexMap<String, Vec<String>>,
}

/// Reads and writes the data directory
///
/// Asset configs are cached per (environment, asset) for the life of the
/// store.
#[derive(Debug)]
pub struct ChannelStore {
    layout: Layout,
    cache: ConfigCache,
}

impl ChannelStore {
    /// Store over an explicit layout
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            cache: ConfigCache::new(),
        }
    }

    /// Store over the data directory at `root`
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(Layout::new(root))
    }

    /// Paths of the data directory
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Configs loaded so far
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Config of one asset; missing or empty files give an empty config
    ///
    /// # Errors
    /// IO and YAML errors, or [`StoreError::NotAMapping`].
    pub fn load_asset(&mut self, env: Environment, asset: &str) -> StoreResult<AssetConfig> {
        if let Some(config) = self.cache.get(env, asset) {
            return Ok(config.clone());
        }
        let path = self.layout.asset_file(env, asset);
        let config = yaml::read_mapping(&path)?;
        tracing::debug!(%env, asset, channels = config.len(), "loaded asset config");
        self.cache.insert(env, asset, config.clone());
        Ok(config)
    }

    /// Write an asset config with sorted channel ids; an empty config
    /// deletes the file
    ///
    /// # Errors
    /// IO and serialization errors.
    pub fn save_asset(&mut self, env: Environment, asset: &str, config: &AssetConfig) -> StoreResult<()> {
        let path = self.layout.asset_file(env, asset);
        if config.is_empty() {
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed empty asset config"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(StoreError::io(&path, err)),
            }
            self.cache.invalidate(env, asset);
            return Ok(());
        }
        let normalized = yaml::normalized(config);
        yaml::write(&path, &ChannelValue::Object(normalized.clone()))?;
        self.cache.insert(env, asset, normalized);
        Ok(())
    }

    /// Ids of every asset of a kind with a config file, sorted
    ///
    /// # Errors
    /// IO errors other than a missing directory.
    pub fn list_assets(&self, env: Environment, kind: AssetKind) -> StoreResult<Vec<String>> {
        let mut assets = yaml_stems(&self.layout.asset_dir(env, kind))?
            .into_iter()
            .map(|(stem, _)| stem)
            .collect::<Vec<_>>();
        assets.sort();
        Ok(assets)
    }

    /// Expand an asset selector
    ///
    /// # Errors
    /// Errors listing asset directories or reading `asset_groups.yaml`.
    pub fn locate_assets(&self, env: Environment, selector: &AssetSelector) -> StoreResult<Vec<String>> {
        match selector {
            AssetSelector::AllOfKind(kind) => self.list_assets(env, *kind),
            AssetSelector::All => {
                let mut assets = self.list_assets(env, AssetKind::GroundStation)?;
                assets.extend(self.list_assets(env, AssetKind::Satellite)?);
                Ok(assets)
            }
            AssetSelector::Named(name) => match self.asset_groups()?.shift_remove(name) {
                Some(group) => Ok(group),
                None => Ok(split_list(name)),
            },
        }
    }

    /// Expand a channel selector
    ///
    /// # Errors
    /// Errors reading templates or `contact_type_defs.yaml`.
    pub fn locate_channels(&self, selector: &ChannelSelector) -> StoreResult<Vec<String>> {
        match selector {
            ChannelSelector::All => {
                let mut channels: Vec<String> = self.templates(AssetKind::GroundStation)?.keys().cloned().collect();
                for channel in self.templates(AssetKind::Satellite)?.keys() {
                    if !channels.contains(channel) {
                        channels.push(channel.clone());
                    }
                }
                Ok(channels)
            }
            ChannelSelector::Named(name) => {
                let mut groups = self.channel_groups()?;
                match groups.shift_remove(&name.to_ascii_lowercase()) {
                    Some(group) => Ok(group),
                    None => Ok(split_list(name)),
                }
            }
        }
    }

    /// `asset_groups.yaml`, empty when absent
    ///
    /// # Errors
    /// Read errors, or [`StoreError::Config`] if the file is not a mapping
    /// of lists.
    pub fn asset_groups(&self) -> StoreResult<IndexMap<String, Vec<String>>> {
        read_typed(&self.layout.asset_groups_file())
    }

    /// `groups` of `contact_type_defs.yaml`, empty when absent
    ///
    /// # Errors
    /// See [`ChannelStore::asset_groups`].
    pub fn channel_groups(&self) -> StoreResult<IndexMap<String, Vec<String>>> {
        let defs: ContactTypeDefs = read_typed(&self.layout.contact_type_defs_file())?;
        Ok(defs.groups)
    }

    /// Template channels for a kind
    ///
    /// # Errors
    /// IO and YAML errors; a missing template file is an IO error.
    pub fn templates(&self, kind: AssetKind) -> StoreResult<AssetConfig> {
        let path = self.layout.template_file(kind);
        if !path.exists() {
            return Err(StoreError::io(
                &path,
                std::io::Error::new(ErrorKind::NotFound, "template file not found"),
            ));
        }
        yaml::read_mapping(&path)
    }

    /// Template record of one channel
    ///
    /// # Errors
    /// [`StoreError::MissingTemplate`] when the channel has no mapping entry.
    pub fn template(&self, kind: AssetKind, channel: &str) -> StoreResult<ChannelRecord> {
        self.templates(kind)?
            .get(channel)
            .and_then(ChannelValue::as_object)
            .cloned()
            .ok_or_else(|| StoreError::MissingTemplate {
                channel: channel.to_string(),
                file: self.layout.template_file_name(kind).to_string(),
            })
    }

    /// Rewrite a template file with sorted channel ids
    ///
    /// # Errors
    /// IO and serialization errors.
    pub fn save_templates(&self, kind: AssetKind, templates: &AssetConfig) -> StoreResult<()> {
        let path = self.layout.template_file(kind);
        yaml::write(&path, &ChannelValue::Object(yaml::normalized(templates)))
    }

    /// Compile `schema.yaml`
    ///
    /// # Errors
    /// [`StoreError::MissingSchema`], YAML errors, or
    /// [`StoreError::Schema`] when a schema is unusable.
    pub fn schemas(&self) -> StoreResult<SchemaSet> {
        let path = self.layout.schema_file();
        let document = yaml::read(&path)?.ok_or_else(|| StoreError::MissingSchema(path.clone()))?;
        Ok(SchemaSet::from_document(&document)?)
    }

    /// Shared separation constraint sets of an environment, sorted by name
    ///
    /// # Errors
    /// IO and YAML errors.
    pub fn shared_sets(&self, env: Environment) -> StoreResult<Vec<SharedSet>> {
        let mut files = yaml_stems(&self.layout.shared_sets_dir(env))?;
        files.sort();
        files
            .into_iter()
            .map(|(name, file)| {
                let document = yaml::read(&file)?.unwrap_or(ChannelValue::Null);
                Ok(SharedSet { name, file, document })
            })
            .collect()
    }
}

/// `(stem, path)` of every `.yaml` file in `dir`; a missing directory is empty
fn yaml_stems(dir: &Path) -> StoreResult<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StoreError::io(dir, err)),
    };
    let mut stems = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| StoreError::io(dir, err))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push((stem.to_string(), path.clone()));
        }
    }
    Ok(stems)
}

/// Read an optional YAML file into a typed value; absent is the default
fn read_typed<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    match yaml::read(path)? {
        None | Some(ChannelValue::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|err| StoreError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}
