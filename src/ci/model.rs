//! Wire models for the Bitrise v0.1 endpoints we consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every Bitrise response wraps its payload in a `data` field, which may be
/// `null` or missing when there is nothing to return.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// An application tracked by this tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub app_slug: String,
    pub name: String,
}

/// Build outcome as reported by the provider.
///
/// The API encodes status as an integer: 0 = not finished, 1 = success,
/// 2 = failed, 3 = aborted, 4 = aborted with success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BuildStatus {
    NotFinished,
    Success,
    Failed,
    Aborted,
}

impl TryFrom<u8> for BuildStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BuildStatus::NotFinished),
            1 => Ok(BuildStatus::Success),
            2 => Ok(BuildStatus::Failed),
            3 | 4 => Ok(BuildStatus::Aborted),
            other => Err(format!("unknown build status code {}", other)),
        }
    }
}

impl From<BuildStatus> for u8 {
    fn from(status: BuildStatus) -> u8 {
        match status {
            BuildStatus::NotFinished => 0,
            BuildStatus::Success => 1,
            BuildStatus::Failed => 2,
            BuildStatus::Aborted => 3,
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::NotFinished => write!(f, "not-finished"),
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Failed => write!(f, "failed"),
            BuildStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Accepts either the status name or its numeric provider code.
impl FromStr for BuildStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return BuildStatus::try_from(code);
        }
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(BuildStatus::Success),
            "failed" | "error" => Ok(BuildStatus::Failed),
            "aborted" => Ok(BuildStatus::Aborted),
            "not-finished" | "in-progress" => Ok(BuildStatus::NotFinished),
            other => Err(format!(
                "invalid status '{}' (expected success, failed, aborted or 0-4)",
                other
            )),
        }
    }
}

/// One CI pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub slug: String,
    pub triggered_workflow: String,
    pub status: BuildStatus,
    pub triggered_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub build_number: u64,
}

/// Artifact summary from the build's artifact listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub slug: String,
    #[serde(default)]
    pub is_public_page_enabled: bool,
}

/// Artifact detail, fetched by slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    #[serde(default)]
    pub public_install_page_url: Option<String>,
    #[serde(default)]
    pub artifact_meta: Option<ArtifactMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    #[serde(default)]
    pub app_info: Option<AppInfo>,
}

/// Version metadata the provider extracts from IPA/APK artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub version_name: Option<String>,
}

impl ArtifactInfo {
    pub fn app_info(&self) -> Option<&AppInfo> {
        self.artifact_meta.as_ref()?.app_info.as_ref()
    }
}
