//! Daemon API versioning.
//!
//! The daemon exposes every API revision under a `/v{major}.{minor}` path
//! prefix. A client is bound to exactly one revision for its lifetime.
//!
//! # Known Versions
//!
//! | Version | Notes |
//! |---------|-------|
//! | 1.17 | Oldest revision this client knows about |
//! | 1.18 – 1.23 | Incremental additions |
//! | 1.24 | Default revision |
//!
//! Versions outside this table are still representable and can be requested
//! explicitly; discovery simply does not try them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A `major.minor` daemon API revision.
///
/// Ordering is numeric, so `1.9 < 1.17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolVersion {
    major: u16,
    minor: u16,
}

impl ProtocolVersion {
    pub const V1_17: Self = Self::new(1, 17);
    pub const V1_18: Self = Self::new(1, 18);
    pub const V1_19: Self = Self::new(1, 19);
    pub const V1_20: Self = Self::new(1, 20);
    pub const V1_21: Self = Self::new(1, 21);
    pub const V1_22: Self = Self::new(1, 22);
    pub const V1_23: Self = Self::new(1, 23);
    pub const V1_24: Self = Self::new(1, 24);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Path prefix the daemon routes this revision under, e.g. `/v1.24`.
    pub fn path_prefix(&self) -> String {
        format!("/v{}", self)
    }

    /// Whether this revision is in [`SUPPORTED_VERSIONS`].
    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(self)
    }
}

/// Every revision discovery tries, oldest first.
pub const SUPPORTED_VERSIONS: [ProtocolVersion; 8] = [
    ProtocolVersion::V1_17,
    ProtocolVersion::V1_18,
    ProtocolVersion::V1_19,
    ProtocolVersion::V1_20,
    ProtocolVersion::V1_21,
    ProtocolVersion::V1_22,
    ProtocolVersion::V1_23,
    ProtocolVersion::V1_24,
];

/// Revision used when the caller does not ask for one.
pub const DEFAULT_VERSION: ProtocolVersion = ProtocolVersion::V1_24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid API version {input:?}: expected MAJOR.MINOR")]
pub struct ParseVersionError {
    input: String,
}

impl FromStr for ProtocolVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (major, minor) = digits.split_once('.').ok_or_else(err)?;
        let major = major.parse::<u16>().map_err(|_| err())?;
        let minor = minor.parse::<u16>().map_err(|_| err())?;
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = ParseVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProtocolVersion> for String {
    fn from(version: ProtocolVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
