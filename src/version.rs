//! Ordered module version type.
//!
//! Gallery module versions are dotted numeric strings with two to four
//! segments ("2.1", "1.0.0", "1.2.3.4"). They are not semver (four-part
//! versions are common), so comparison is done numerically per segment
//! with missing segments treated as zero: "1.0" == "1.0.0" < "1.0.1".

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SyncError;

/// A dotted numeric module version, compared segment-wise.
#[derive(Debug, Clone)]
pub struct ModuleVersion {
    segments: Vec<u64>,
}

impl ModuleVersion {
    /// Parse a version string, rejecting anything that is not a dotted
    /// sequence of decimal numbers.
    pub fn parse(input: &str) -> Result<Self, SyncError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SyncError::InvalidVersion {
                value: input.to_string(),
            });
        }

        let segments = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| SyncError::InvalidVersion {
                    value: input.to_string(),
                })
            })
            .collect::<Result<Vec<u64>, SyncError>>()?;

        Ok(Self { segments })
    }
}

impl FromStr for ModuleVersion {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModuleVersion {}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl Serialize for ModuleVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModuleVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
