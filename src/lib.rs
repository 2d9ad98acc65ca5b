//! installpages -- latest public install pages for CI-built mobile apps.
//!
//! This crate queries the Bitrise API for each configured application, picks
//! the latest build matching a workflow/status filter, resolves its public
//! install page and version, and emits JSON and Markdown reports.

pub mod ci;
pub mod config;
pub mod output;
pub mod pipeline;

use std::path::PathBuf;

use anyhow::Result;

use ci::{Application, BuildStatus, CiApi};
use pipeline::{BuildFilter, RunReport, WorkflowReports};

/// Single-filter run: the latest build per app for one workflow/status pair.
pub async fn fetch(
    api: &dyn CiApi,
    apps: &[Application],
    filter: &BuildFilter,
    output: Option<&std::path::Path>,
) -> Result<RunReport> {
    config::validate_apps(apps)?;
    let report = pipeline::run_all(api, apps, filter).await;
    if let Some(path) = output {
        output::write_json(path, &report)?;
        tracing::info!(path = %path.display(), "Wrote report");
    }
    Ok(report)
}

/// Where and how the multi-workflow report is written.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub workflows: Vec<String>,
    pub status: Option<BuildStatus>,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
    pub title: String,
}

/// Run every workflow, then write the keyed JSON data and the Markdown document.
pub async fn report(
    api: &dyn CiApi,
    apps: &[Application],
    opts: &ReportOptions,
) -> Result<WorkflowReports> {
    config::validate_apps(apps)?;
    if opts.workflows.is_empty() {
        anyhow::bail!("no workflows configured");
    }

    let reports = pipeline::run_workflows(api, apps, &opts.workflows, opts.status).await;
    tracing::info!("Captured information from all workflows");

    output::write_workflow_reports(&opts.json_path, &reports)?;
    output::write_markdown(&opts.markdown_path, &opts.title, &reports)?;
    tracing::info!(
        json = %opts.json_path.display(),
        markdown = %opts.markdown_path.display(),
        "Completed building markdown"
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::fakes::MemoryCi;

    #[tokio::test]
    async fn test_fetch_rejects_empty_app_list_before_any_call() {
        let api = MemoryCi::new();
        let err = fetch(&api, &[], &BuildFilter::default(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no applications configured"));
        assert!(api.calls().is_empty());
    }
}
