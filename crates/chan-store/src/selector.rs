//! Asset and channel selectors as typed on the command line

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chan_rules::AssetKind;

/// Which assets a command acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSelector {
    /// `all`: every ground station, then every satellite
    All,
    /// `all_gs` or `all_sat`
    AllOfKind(AssetKind),
    /// A group name from `asset_groups.yaml`, or else a comma list
    Named(String),
}

impl FromStr for AssetSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => Self::All,
            "all_gs" => Self::AllOfKind(AssetKind::GroundStation),
            "all_sat" => Self::AllOfKind(AssetKind::Satellite),
            other => Self::Named(other.to_string()),
        })
    }
}

impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::AllOfKind(AssetKind::GroundStation) => f.write_str("all_gs"),
            Self::AllOfKind(AssetKind::Satellite) => f.write_str("all_sat"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Which channels a command acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelector {
    /// `all`: every template channel
    All,
    /// A group from `contact_type_defs.yaml`, or else a comma list
    Named(String),
}

impl FromStr for ChannelSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(s.to_string())
        })
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Split a comma list, dropping blanks
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_keywords() {
        assert_eq!("all".parse::<AssetSelector>(), Ok(AssetSelector::All));
        assert_eq!(
            "all_gs".parse::<AssetSelector>(),
            Ok(AssetSelector::AllOfKind(AssetKind::GroundStation))
        );
        assert_eq!(
            "FM1,FM2".parse::<AssetSelector>(),
            Ok(AssetSelector::Named("FM1,FM2".to_string()))
        );
        assert_eq!(AssetSelector::AllOfKind(AssetKind::Satellite).to_string(), "all_sat");
    }

    #[test]
    fn channel_keywords() {
        assert_eq!("ALL".parse::<ChannelSelector>(), Ok(ChannelSelector::All));
        assert_eq!(
            "uhf".parse::<ChannelSelector>(),
            Ok(ChannelSelector::Named("uhf".to_string()))
        );
    }

    #[test]
    fn comma_lists() {
        assert_eq!(split_list("a, b,,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
