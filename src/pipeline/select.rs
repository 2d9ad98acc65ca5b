//! Latest-build selection.

use crate::ci::{Build, BuildStatus};

/// Optional, independent build filters (combined with logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BuildFilter {
    pub workflow: Option<String>,
    pub status: Option<BuildStatus>,
}

impl BuildFilter {
    pub fn new(workflow: Option<String>, status: Option<BuildStatus>) -> Self {
        Self { workflow, status }
    }

    pub fn matches(&self, build: &Build) -> bool {
        let workflow_ok = self
            .workflow
            .as_deref()
            .map_or(true, |wf| build.triggered_workflow == wf);
        let status_ok = self.status.map_or(true, |st| build.status == st);
        workflow_ok && status_ok
    }
}

/// Pick the matching build with the greatest `triggered_at`.
///
/// Ties keep the first build encountered. Returns `None` when nothing
/// matches the filter.
pub fn select_latest_build<'a>(builds: &'a [Build], filter: &BuildFilter) -> Option<&'a Build> {
    builds
        .iter()
        .filter(|b| filter.matches(b))
        .fold(None, |latest: Option<&Build>, b| match latest {
            Some(cur) if cur.triggered_at >= b.triggered_at => Some(cur),
            _ => Some(b),
        })
}
