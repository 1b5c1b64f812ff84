//! Semantic version value type.
//!
//! Schema versions are plain `major.minor.patch` triples without pre-release
//! or build metadata. The canonical textual form is `"M.m.p"` and parsing it
//! back must yield the same value.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// Semantic version of a schema.
///
/// Ordered by `(major, minor, patch)`. Serializes as the `"M.m.p"` string and
/// deserializes from either that string or a `{major, minor, patch}` object.
///
/// # Examples
///
/// ```
/// use schema_tools_core::SemanticVersion;
///
/// let v: SemanticVersion = "1.2.3".parse().unwrap();
/// assert_eq!(v, SemanticVersion::new(1, 2, 3));
/// assert_eq!(v.to_string(), "1.2.3");
/// assert!(SemanticVersion::new(1, 10, 0) > SemanticVersion::new(1, 2, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the next minor version, keeping `major` and `patch`.
    ///
    /// Used when a schema is extended with backward-compatible additions.
    pub fn bump_minor(self) -> Self {
        Self {
            minor: self.minor + 1,
            ..self
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidVersion(s.to_string());

        let mut parts = s.split('.');
        let mut next = || -> Result<u64, ModelError> {
            let part = parts.next().ok_or_else(invalid)?;
            // Reject "+1", "01" and friends so the string form round-trips.
            if part.is_empty()
                || !part.bytes().all(|b| b.is_ascii_digit())
                || (part.len() > 1 && part.starts_with('0'))
            {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SemanticVersionVisitor)
    }
}

struct SemanticVersionVisitor;

impl<'de> Visitor<'de> for SemanticVersionVisitor {
    type Value = SemanticVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a \"major.minor.patch\" string or a {major, minor, patch} object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let (mut major, mut minor, mut patch) = (None, None, None);
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "major" => major = Some(map.next_value()?),
                "minor" => minor = Some(map.next_value()?),
                "patch" => patch = Some(map.next_value()?),
                _ => {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
        }
        Ok(SemanticVersion {
            major: major.ok_or_else(|| de::Error::missing_field("major"))?,
            minor: minor.ok_or_else(|| de::Error::missing_field("minor"))?,
            patch: patch.ok_or_else(|| de::Error::missing_field("patch"))?,
        })
    }
}
