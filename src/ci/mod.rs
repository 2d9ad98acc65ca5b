//! CI provider access: wire models, the `CiApi` seam, and its implementations.

pub mod client;
pub mod fakes;
pub mod model;

pub use client::{BitriseClient, ClientConfig};
pub use model::{AppInfo, Application, Artifact, ArtifactInfo, Build, BuildStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} returned no data")]
    NoData { url: String },

    #[error("API token is not a valid header value")]
    InvalidToken,
}

/// The three read-only endpoints the pipeline consumes.
#[async_trait::async_trait]
pub trait CiApi: Send + Sync {
    /// List builds for an application, newest first as the provider returns them.
    async fn list_builds(&self, app_slug: &str) -> Result<Vec<Build>, ClientError>;

    /// List artifact summaries for one build.
    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
    ) -> Result<Vec<Artifact>, ClientError>;

    /// Fetch the detail record of one artifact.
    async fn artifact_info(
        &self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
    ) -> Result<ArtifactInfo, ClientError>;
}
