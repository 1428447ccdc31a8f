use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::version::ProtocolVersion;

/// Reply to `GET /v{api}/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub version: String,
    pub api_version: ProtocolVersion,
    #[serde(rename = "MinAPIVersion", default, skip_serializing_if = "Option::is_none")]
    pub min_api_version: Option<ProtocolVersion>,
    #[serde(default)]
    pub git_commit: String,
    #[serde(default)]
    pub go_version: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub build_time: Option<DateTime<Utc>>,
}

impl VersionInfo {
    /// Whether the daemon claims to serve `version`.
    ///
    /// Daemons that omit `MinAPIVersion` only report their newest revision, so
    /// anything up to it is assumed to be served.
    pub fn serves(&self, version: ProtocolVersion) -> bool {
        let above_min = self.min_api_version.map_or(true, |min| version >= min);
        above_min && version <= self.api_version
    }
}

// Older daemons report build times in ctime format; those are dropped rather
// than failing the whole reply.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
