//! JSON persistence of run reports.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::pipeline::WorkflowReports;

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("serialize report")?;
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Persist reports keyed by workflow name.
pub fn write_workflow_reports(path: &Path, reports: &WorkflowReports) -> Result<()> {
    write_json(path, reports)
}

pub fn read_workflow_reports(path: &Path) -> Result<WorkflowReports> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))
}
