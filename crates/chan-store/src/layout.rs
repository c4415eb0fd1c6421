//! Data directory conventions
//!
//! ```text
//! <root>/
//!   schema.yaml
//!   gs_templates.yaml, sat_templates.yaml   (or a shared templates.yaml)
//!   asset_groups.yaml
//!   contact_type_defs.yaml
//!   <env>/gs/<asset>.yaml
//!   <env>/sat/<asset>.yaml
//!   <env>/shared_separation_constraint_sets/<name>.yaml
//! ```

use std::path::{Path, PathBuf};

use chan_rules::{AssetKind, Environment};

/// Schema document
pub const SCHEMA_FILE: &str = "schema.yaml";
/// Ground station templates
pub const GS_TEMPLATE_FILE: &str = "gs_templates.yaml";
/// Satellite templates
pub const SAT_TEMPLATE_FILE: &str = "sat_templates.yaml";
/// Templates shared by both kinds, used when a split file is absent
pub const SHARED_TEMPLATE_FILE: &str = "templates.yaml";
/// Named asset lists
pub const ASSET_GROUPS_FILE: &str = "asset_groups.yaml";
/// Named channel lists under `groups`
pub const CONTACT_TYPE_DEFS_FILE: &str = "contact_type_defs.yaml";
/// Per-environment shared separation constraint sets
pub const SHARED_SETS_DIR: &str = "shared_separation_constraint_sets";

/// Paths inside a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Layout rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<env>`
    #[must_use]
    pub fn env_dir(&self, env: Environment) -> PathBuf {
        self.root.join(env.as_str())
    }

    /// Directory holding the configs of one asset kind
    #[must_use]
    pub fn asset_dir(&self, env: Environment, kind: AssetKind) -> PathBuf {
        self.env_dir(env).join(kind.dir_name())
    }

    /// Config file of an asset, kind inferred from its id
    #[must_use]
    pub fn asset_file(&self, env: Environment, asset: &str) -> PathBuf {
        self.asset_dir(env, AssetKind::infer(asset)).join(format!("{asset}.yaml"))
    }

    /// Shared separation constraint sets of an environment
    #[must_use]
    pub fn shared_sets_dir(&self, env: Environment) -> PathBuf {
        self.env_dir(env).join(SHARED_SETS_DIR)
    }

    /// `<root>/schema.yaml`
    #[must_use]
    pub fn schema_file(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE)
    }

    /// Template file name for a kind, relative to the root
    ///
    /// The split file wins when it exists; otherwise the shared
    /// `templates.yaml` is used.
    #[must_use]
    pub fn template_file_name(&self, kind: AssetKind) -> &'static str {
        let split = match kind {
            AssetKind::GroundStation => GS_TEMPLATE_FILE,
            AssetKind::Satellite => SAT_TEMPLATE_FILE,
        };
        if self.root.join(split).exists() || !self.root.join(SHARED_TEMPLATE_FILE).exists() {
            split
        } else {
            SHARED_TEMPLATE_FILE
        }
    }

    /// Resolved template file for a kind
    #[must_use]
    pub fn template_file(&self, kind: AssetKind) -> PathBuf {
        self.root.join(self.template_file_name(kind))
    }

    /// `<root>/asset_groups.yaml`
    #[must_use]
    pub fn asset_groups_file(&self) -> PathBuf {
        self.root.join(ASSET_GROUPS_FILE)
    }

    /// `<root>/contact_type_defs.yaml`
    #[must_use]
    pub fn contact_type_defs_file(&self) -> PathBuf {
        self.root.join(CONTACT_TYPE_DEFS_FILE)
    }

    /// Path shown to users: relative to the root when inside it
    #[must_use]
    pub fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn asset_files_follow_kind() {
        let layout = Layout::new("/data");
        assert_eq!(
            layout.asset_file(Environment::Staging, "sydney-gs"),
            PathBuf::from("/data/staging/gs/sydney-gs.yaml")
        );
        assert_eq!(
            layout.asset_file(Environment::Production, "FM101"),
            PathBuf::from("/data/production/sat/FM101.yaml")
        );
        assert_eq!(
            layout.display(&layout.asset_file(Environment::Staging, "FM1")),
            "staging/sat/FM1.yaml"
        );
    }

    #[test]
    fn templates_fall_back_to_shared_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        assert_eq!(layout.template_file_name(AssetKind::Satellite), SAT_TEMPLATE_FILE);

        fs::write(dir.path().join(SHARED_TEMPLATE_FILE), "{}").unwrap();
        assert_eq!(layout.template_file_name(AssetKind::Satellite), SHARED_TEMPLATE_FILE);

        fs::write(dir.path().join(SAT_TEMPLATE_FILE), "{}").unwrap();
        assert_eq!(layout.template_file_name(AssetKind::Satellite), SAT_TEMPLATE_FILE);
        assert_eq!(layout.template_file_name(AssetKind::GroundStation), SHARED_TEMPLATE_FILE);
    }
}
