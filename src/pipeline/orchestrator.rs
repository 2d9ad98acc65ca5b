//! Sequential per-application runs with failure isolation.

use super::report::{AppFailure, ResultRecord, RunReport, WorkflowReports};
use super::resolve::resolve_public_artifact;
use super::select::{select_latest_build, BuildFilter};
use super::{PipelineError, Stage};
use crate::ci::{Application, BuildStatus, CiApi};
use tracing::{error, info, warn};

/// Run the whole pipeline for one application.
pub async fn process_app(
    api: &dyn CiApi,
    app: &Application,
    filter: &BuildFilter,
) -> Result<ResultRecord, PipelineError> {
    let builds = api
        .list_builds(&app.app_slug)
        .await
        .map_err(PipelineError::transport(Stage::FetchBuilds))?;
    if builds.is_empty() {
        return Err(PipelineError::NoBuildsAvailable);
    }

    let build = select_latest_build(&builds, filter).ok_or(PipelineError::NoLatestBuild)?;
    info!(app = %app.name, build_slug = %build.slug, build_number = build.build_number, "Got latest build");

    let resolved = resolve_public_artifact(api, &app.app_slug, build).await?;
    info!(app = %app.name, url = %resolved.url, "Got public install page");

    Ok(ResultRecord {
        name: app.name.clone(),
        public_install_page_url: resolved.url,
        build_number: resolved.build_number,
        version: resolved.version,
        build_finished_at: resolved.finished_at,
    })
}

/// Process every application in order; one failure never stops the others.
pub async fn run_all(api: &dyn CiApi, apps: &[Application], filter: &BuildFilter) -> RunReport {
    let label = filter.workflow.as_deref().unwrap_or("*");
    info!(workflow = %label, status = ?filter.status, apps = apps.len(), "Starting run");

    let mut records = Vec::with_capacity(apps.len());
    let mut failures = Vec::new();

    for app in apps {
        info!(workflow = %label, app = %app.name, "Getting latest artifact");
        match process_app(api, app, filter).await {
            Ok(record) => {
                info!(app = %app.name, "Completed");
                records.push(record);
            }
            Err(e) => {
                warn!(app = %app.name, error = %e, "Failed");
                failures.push(AppFailure {
                    name: app.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let report = RunReport::new(filter.clone(), records, failures);
    if report.failures.is_empty() {
        info!(workflow = %label, "All app data captured");
    } else {
        error!(
            workflow = %label,
            failed = report.failures.len(),
            total = report.total(),
            apps = %report.failed_names().join(", "),
            "Some apps failed"
        );
    }
    if let Some(w) = &report.warning {
        warn!(workflow = %label, "Build date mismatch: {}", w);
    }
    report
}

/// Run each workflow independently, keyed by workflow name in the given order.
pub async fn run_workflows(
    api: &dyn CiApi,
    apps: &[Application],
    workflows: &[String],
    status: Option<BuildStatus>,
) -> WorkflowReports {
    let mut reports = WorkflowReports::new();
    for workflow in workflows {
        let filter = BuildFilter::new(Some(workflow.clone()), status);
        let report = run_all(api, apps, &filter).await;
        reports.insert(workflow.clone(), report);
    }
    reports
}
