//! Build-selection and artifact-resolution pipeline.

pub mod orchestrator;
pub mod report;
pub mod resolve;
pub mod select;

pub use orchestrator::{process_app, run_all, run_workflows};
pub use report::{AppFailure, ResultRecord, RunReport, WorkflowReports};
pub use resolve::{resolve_public_artifact, ResolvedArtifact};
pub use select::{select_latest_build, BuildFilter};

use crate::ci::ClientError;
use thiserror::Error;

/// Network step of the per-application pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchBuilds,
    FetchArtifacts,
    FetchArtifactDetail,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::FetchBuilds => write!(f, "fetch builds"),
            Stage::FetchArtifacts => write!(f, "fetch artifacts"),
            Stage::FetchArtifactDetail => write!(f, "fetch artifact detail"),
        }
    }
}

/// Why one application's pipeline stopped short of a result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: ClientError,
    },

    #[error("no builds available")]
    NoBuildsAvailable,

    #[error("no build matches the filter")]
    NoLatestBuild,

    #[error("no artifact has a public install page enabled")]
    NoPublicArtifact,

    #[error("artifact detail is missing {0}")]
    MissingField(&'static str),
}

impl PipelineError {
    pub(crate) fn transport(stage: Stage) -> impl FnOnce(ClientError) -> Self {
        move |source| PipelineError::Transport { stage, source }
    }
}
