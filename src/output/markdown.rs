//! Markdown rendering of workflow reports.

use anyhow::{Context, Result};
use std::path::Path;

use crate::pipeline::{ResultRecord, WorkflowReports};

const HEADERS: [&str; 5] = [
    "Name",
    "Public Install Page",
    "Build Number",
    "App Version",
    "Finished At",
];

/// Render one H2 section per workflow under an H1 title.
pub fn render_markdown(title: &str, reports: &WorkflowReports) -> String {
    let mut out = format!("# {}\n", title);

    for (workflow, report) in reports.iter() {
        out.push_str(&format!("\n## {}\n\n", workflow.to_uppercase()));

        if let Some(warning) = &report.warning {
            out.push_str(&format!("> **Warning:** {}\n\n", escape(warning)));
        }

        if report.records.is_empty() {
            out.push_str("_No apps captured._\n");
        } else {
            out.push_str(&format!("| {} |\n", HEADERS.join(" | ")));
            out.push_str(&format!("|{}\n", " --- |".repeat(HEADERS.len())));
            for record in &report.records {
                out.push_str(&row(record));
            }
        }

        if !report.failures.is_empty() {
            out.push_str(&format!(
                "\nFailed ({}/{}): {}\n",
                report.failures.len(),
                report.total(),
                report.failed_names().join(", ")
            ));
        }
    }
    out
}

fn row(record: &ResultRecord) -> String {
    let finished = record
        .build_finished_at
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default();
    format!(
        "| {} | {} | {} | {} | {} |\n",
        escape(&record.name),
        escape(&record.public_install_page_url),
        record.build_number,
        escape(record.version.as_deref().unwrap_or("")),
        finished
    )
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

pub fn write_markdown(path: &Path, title: &str, reports: &WorkflowReports) -> Result<()> {
    let md = render_markdown(title, reports);
    std::fs::write(path, md).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{AppFailure, BuildFilter, RunReport};
    use chrono::{TimeZone, Utc};

    fn record(name: &str, day: u32) -> ResultRecord {
        ResultRecord {
            name: name.to_string(),
            public_install_page_url: format!("https://i.app/{}", name),
            build_number: 12,
            version: Some("1.0|beta".to_string()),
            build_finished_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 10, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_renders_table_per_workflow() {
        let mut reports = WorkflowReports::new();
        reports.insert(
            "uat".to_string(),
            RunReport::new(BuildFilter::default(), vec![record("Reporter", 10)], vec![]),
        );
        let md = render_markdown("Mobile Apps", &reports);

        assert!(md.starts_with("# Mobile Apps\n"));
        assert!(md.contains("## UAT"));
        assert!(md.contains("| Name | Public Install Page | Build Number | App Version | Finished At |"));
        assert!(md.contains("| Reporter | https://i.app/Reporter | 12 | 1.0\\|beta | 2024-01-10T10:30:00Z |"));
        assert!(!md.contains("Warning"));
    }

    #[test]
    fn test_renders_failures_and_warning() {
        let mut reports = WorkflowReports::new();
        reports.insert(
            "qa".to_string(),
            RunReport::new(
                BuildFilter::default(),
                vec![record("A", 10), record("B", 11)],
                vec![AppFailure {
                    name: "C".to_string(),
                    reason: "no build matches the filter".to_string(),
                }],
            ),
        );
        let md = render_markdown("Apps", &reports);
        assert!(md.contains("> **Warning:** builds finished on 2 different days"));
        assert!(md.contains("Failed (1/3): C"));
    }

    #[test]
    fn test_empty_workflow_has_placeholder() {
        let mut reports = WorkflowReports::new();
        reports.insert(
            "qa".to_string(),
            RunReport::new(BuildFilter::default(), vec![], vec![]),
        );
        assert!(render_markdown("Apps", &reports).contains("_No apps captured._"));
    }
}
