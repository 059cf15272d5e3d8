//! Platform identifiers and filter values

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// One of the four supported social networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlatformId {
    Facebook,
    Twitter,
    Instagram,
    LinkedIn,
}

impl PlatformId {
    /// All platforms in display order
    pub const ALL: [PlatformId; 4] = [
        PlatformId::Facebook,
        PlatformId::Twitter,
        PlatformId::Instagram,
        PlatformId::LinkedIn,
    ];

    /// Lowercase identifier used on the wire and in filters
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Facebook => "facebook",
            PlatformId::Twitter => "twitter",
            PlatformId::Instagram => "instagram",
            PlatformId::LinkedIn => "linkedin",
        }
    }

    /// Human-readable name shown in tables and charts
    pub fn label(&self) -> &'static str {
        match self {
            PlatformId::Facebook => "Facebook",
            PlatformId::Twitter => "Twitter",
            PlatformId::Instagram => "Instagram",
            PlatformId::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = ModelError;

    /// Case-insensitive, so "Facebook" and "facebook" are the same platform.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformId::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownPlatform(s.to_string()))
    }
}

impl Serialize for PlatformId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct PlatformVisitor;

impl<'de> Visitor<'de> for PlatformVisitor {
    type Value = PlatformId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one of facebook, twitter, instagram, linkedin")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for PlatformId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PlatformVisitor)
    }
}

/// Platform narrowing criterion: everything, or a single platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(PlatformId),
}

impl PlatformFilter {
    /// Whether a post on `platform` passes this filter
    pub fn matches(&self, platform: PlatformId) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => *p == platform,
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFilter::All => f.write_str("all"),
            PlatformFilter::Only(p) => p.fmt(f),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(PlatformFilter::All)
        } else {
            s.parse().map(PlatformFilter::Only)
        }
    }
}

impl From<PlatformId> for PlatformFilter {
    fn from(platform: PlatformId) -> Self {
        PlatformFilter::Only(platform)
    }
}

impl Serialize for PlatformFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlatformFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Facebook".parse::<PlatformId>().unwrap(), PlatformId::Facebook);
        assert_eq!("LINKEDIN".parse::<PlatformId>().unwrap(), PlatformId::LinkedIn);
        assert!("snapchat".parse::<PlatformId>().is_err());
    }

    #[test]
    fn test_filter_round_trip_through_strings() {
        assert_eq!("all".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
        assert_eq!(
            "twitter".parse::<PlatformFilter>().unwrap(),
            PlatformFilter::Only(PlatformId::Twitter)
        );
        assert_eq!(PlatformFilter::Only(PlatformId::Instagram).to_string(), "instagram");
    }

    #[test]
    fn test_platform_as_map_key() {
        let json = r#"{"Twitter": 3, "facebook": 1}"#;
        let map: std::collections::BTreeMap<PlatformId, u32> = serde_json::from_str(json).unwrap();
        assert_eq!(map[&PlatformId::Facebook], 1);
        assert_eq!(map[&PlatformId::Twitter], 3);
    }
}
