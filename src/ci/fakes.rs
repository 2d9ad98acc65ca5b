//! In-memory `CiApi` (testing and dry runs)
//!
//! `MemoryCi` serves canned builds, artifacts and artifact details keyed by
//! slug, and can be told to fail a specific endpoint for a specific app.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::model::{Artifact, ArtifactInfo, Build};
use super::{CiApi, ClientError};

/// Endpoint at which a simulated transport failure is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Builds,
    Artifacts,
    ArtifactInfo,
}

#[derive(Debug, Default)]
pub struct MemoryCi {
    builds: HashMap<String, Vec<Build>>,
    artifacts: HashMap<(String, String), Vec<Artifact>>,
    infos: HashMap<(String, String, String), ArtifactInfo>,
    failures: HashSet<(String, FailPoint)>,
    calls: Mutex<Vec<String>>,
}

impl MemoryCi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builds(mut self, app_slug: &str, builds: Vec<Build>) -> Self {
        self.builds.insert(app_slug.to_string(), builds);
        self
    }

    pub fn with_artifacts(mut self, app_slug: &str, build_slug: &str, artifacts: Vec<Artifact>) -> Self {
        self.artifacts
            .insert((app_slug.to_string(), build_slug.to_string()), artifacts);
        self
    }

    pub fn with_info(
        mut self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
        info: ArtifactInfo,
    ) -> Self {
        self.infos.insert(
            (
                app_slug.to_string(),
                build_slug.to_string(),
                artifact_slug.to_string(),
            ),
            info,
        );
        self
    }

    pub fn failing(mut self, app_slug: &str, point: FailPoint) -> Self {
        self.failures.insert((app_slug.to_string(), point));
        self
    }

    /// Endpoint calls seen so far, formatted as `endpoint:app[/build[/artifact]]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    fn check(&self, app_slug: &str, point: FailPoint) -> Result<(), ClientError> {
        if self.failures.contains(&(app_slug.to_string(), point)) {
            return Err(ClientError::Status {
                status: 503,
                url: format!("memory://{}/{:?}", app_slug, point),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CiApi for MemoryCi {
    async fn list_builds(&self, app_slug: &str) -> Result<Vec<Build>, ClientError> {
        self.record(format!("builds:{}", app_slug));
        self.check(app_slug, FailPoint::Builds)?;
        Ok(self.builds.get(app_slug).cloned().unwrap_or_default())
    }

    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
    ) -> Result<Vec<Artifact>, ClientError> {
        self.record(format!("artifacts:{}/{}", app_slug, build_slug));
        self.check(app_slug, FailPoint::Artifacts)?;
        Ok(self
            .artifacts
            .get(&(app_slug.to_string(), build_slug.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn artifact_info(
        &self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
    ) -> Result<ArtifactInfo, ClientError> {
        self.record(format!(
            "artifact_info:{}/{}/{}",
            app_slug, build_slug, artifact_slug
        ));
        self.check(app_slug, FailPoint::ArtifactInfo)?;
        self.infos
            .get(&(
                app_slug.to_string(),
                build_slug.to_string(),
                artifact_slug.to_string(),
            ))
            .cloned()
            .ok_or(ClientError::Status {
                status: 404,
                url: format!("memory://{}/{}/{}", app_slug, build_slug, artifact_slug),
            })
    }
}
