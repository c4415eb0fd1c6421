//! Deployment environments and asset kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A deployment environment with its own set of asset configs
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Pre-production fleet
    #[default]
    Staging,
    /// Live fleet
    Production,
}

impl Environment {
    /// Every environment, in validation order
    pub const ALL: [Self; 2] = [Self::Staging, Self::Production];

    /// Directory and command-line name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised environment name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}', expected one of: staging, production")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| UnknownEnvironment(s.to_string()))
    }
}

/// Kind of asset a config belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    /// Ground station antenna
    GroundStation,
    /// Satellite
    Satellite,
}

impl AssetKind {
    /// Infer the kind from an asset identifier.
    ///
    /// Ground station ids end in `gs` or `kl`; everything else is a satellite.
    #[must_use]
    pub fn infer(asset_id: &str) -> Self {
        let lower = asset_id.to_ascii_lowercase();
        if lower.ends_with("gs") || lower.ends_with("kl") {
            Self::GroundStation
        } else {
            Self::Satellite
        }
    }

    /// Sub-directory holding configs of this kind
    #[inline]
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::GroundStation => "gs",
            Self::Satellite => "sat",
        }
    }

    /// Human label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GroundStation => "ground station",
            Self::Satellite => "satellite",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
