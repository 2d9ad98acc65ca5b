//! Public-artifact resolution for a chosen build.

use super::{PipelineError, Stage};
use crate::ci::{AppInfo, Artifact, Build, CiApi};
use chrono::{DateTime, Utc};
use tracing::info;

/// Install link and version metadata resolved for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArtifact {
    pub artifact_slug: String,
    pub url: String,
    pub version: Option<String>,
    pub build_number: u64,
    pub finished_at: Option<DateTime<Utc>>,
}

/// First artifact with a public install page enabled.
pub fn select_public_artifact(artifacts: &[Artifact]) -> Option<&Artifact> {
    artifacts.iter().find(|a| a.is_public_page_enabled)
}

/// `version`, else `version_name`; blank values count as missing.
pub fn extract_version(app_info: Option<&AppInfo>) -> Option<String> {
    let info = app_info?;
    [info.version.as_deref(), info.version_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn resolve_public_artifact(
    api: &dyn CiApi,
    app_slug: &str,
    build: &Build,
) -> Result<ResolvedArtifact, PipelineError> {
    let artifacts = api
        .list_artifacts(app_slug, &build.slug)
        .await
        .map_err(PipelineError::transport(Stage::FetchArtifacts))?;

    let artifact = select_public_artifact(&artifacts).ok_or(PipelineError::NoPublicArtifact)?;
    info!(artifact_slug = %artifact.slug, "Got public artifact");

    let detail = api
        .artifact_info(app_slug, &build.slug, &artifact.slug)
        .await
        .map_err(PipelineError::transport(Stage::FetchArtifactDetail))?;

    let url = detail
        .public_install_page_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(PipelineError::MissingField("public_install_page_url"))?
        .to_string();

    Ok(ResolvedArtifact {
        artifact_slug: artifact.slug.clone(),
        url,
        version: extract_version(detail.app_info()),
        build_number: build.build_number,
        finished_at: build.finished_at,
    })
}
