//! Per-application results and the aggregate run report.

use super::select::BuildFilter;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Output of one successful application pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub name: String,
    pub public_install_page_url: String,
    pub build_number: u64,
    pub version: Option<String>,
    pub build_finished_at: Option<DateTime<Utc>>,
}

/// An application whose pipeline ended in a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFailure {
    pub name: String,
    pub reason: String,
}

/// Aggregate of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub filter: BuildFilter,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<ResultRecord>,
    /// App name -> public install page URL.
    pub install_pages: BTreeMap<String, String>,
    pub failures: Vec<AppFailure>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl RunReport {
    pub fn new(filter: BuildFilter, records: Vec<ResultRecord>, failures: Vec<AppFailure>) -> Self {
        let install_pages = records
            .iter()
            .map(|r| (r.name.clone(), r.public_install_page_url.clone()))
            .collect();
        let warning = date_mismatch_warning(&records);
        Self {
            filter,
            generated_at: Utc::now(),
            records,
            install_pages,
            failures,
            warning,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn has_date_mismatch(&self) -> bool {
        self.warning.is_some()
    }

    /// One-line outcome, e.g. "3/4 apps captured; failed: Foo".
    pub fn summary(&self) -> String {
        let mut line = format!("{}/{} apps captured", self.succeeded(), self.total());
        if !self.failures.is_empty() {
            line.push_str(&format!("; failed: {}", self.failed_names().join(", ")));
        }
        line
    }
}

/// Distinct UTC calendar days on which the recorded builds finished.
pub fn finish_days(records: &[ResultRecord]) -> BTreeSet<NaiveDate> {
    records
        .iter()
        .filter_map(|r| r.build_finished_at)
        .map(|t| t.date_naive())
        .collect()
}

fn date_mismatch_warning(records: &[ResultRecord]) -> Option<String> {
    let days = finish_days(records);
    if days.len() <= 1 {
        return None;
    }
    let listed: Vec<String> = days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    Some(format!(
        "builds finished on {} different days: {}",
        days.len(),
        listed.join(", ")
    ))
}

/// Reports keyed by workflow name, kept in the order the workflows were run.
///
/// Serializes as a JSON object whose keys appear in run order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowReports(Vec<(String, RunReport)>);

impl WorkflowReports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the report for `workflow`, keeping its first position.
    pub fn insert(&mut self, workflow: String, report: RunReport) {
        match self.0.iter_mut().find(|(wf, _)| *wf == workflow) {
            Some(slot) => slot.1 = report,
            None => self.0.push((workflow, report)),
        }
    }

    pub fn get(&self, workflow: &str) -> Option<&RunReport> {
        self.0.iter().find(|(wf, _)| wf == workflow).map(|(_, r)| r)
    }

    pub fn workflows(&self) -> Vec<&str> {
        self.0.iter().map(|(wf, _)| wf.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunReport)> {
        self.0.iter().map(|(wf, r)| (wf.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<&str> for WorkflowReports {
    type Output = RunReport;

    fn index(&self, workflow: &str) -> &RunReport {
        match self.get(workflow) {
            Some(report) => report,
            None => panic!("no report for workflow '{}'", workflow),
        }
    }
}

impl Serialize for WorkflowReports {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(wf, r)| (wf, r)))
    }
}

impl<'de> Deserialize<'de> for WorkflowReports {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportsVisitor;

        impl<'de> Visitor<'de> for ReportsVisitor {
            type Value = WorkflowReports;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of workflow name to run report")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut reports = WorkflowReports::new();
                while let Some((workflow, report)) = map.next_entry::<String, RunReport>()? {
                    reports.insert(workflow, report);
                }
                Ok(reports)
            }
        }

        deserializer.deserialize_map(ReportsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, day: u32, hour: u32) -> ResultRecord {
        ResultRecord {
            name: name.to_string(),
            public_install_page_url: format!("https://i.app/{}", name),
            build_number: 1,
            version: None,
            build_finished_at: Some(Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_same_day_has_no_warning() {
        let report = RunReport::new(
            BuildFilter::default(),
            vec![record("A", 10, 1), record("B", 10, 23)],
            vec![],
        );
        assert!(!report.has_date_mismatch());
    }

    #[test]
    fn test_different_days_warn() {
        let report = RunReport::new(
            BuildFilter::default(),
            vec![record("A", 10, 12), record("B", 11, 12)],
            vec![],
        );
        let warning = report.warning.as_deref().unwrap();
        assert!(warning.contains("2024-01-10"));
        assert!(warning.contains("2024-01-11"));
    }

    #[test]
    fn test_records_without_finish_time_are_ignored() {
        let mut unfinished = record("C", 12, 0);
        unfinished.build_finished_at = None;
        let report = RunReport::new(
            BuildFilter::default(),
            vec![record("A", 10, 12), unfinished],
            vec![],
        );
        assert!(!report.has_date_mismatch());
    }

    #[test]
    fn test_index_and_summary() {
        let report = RunReport::new(
            BuildFilter::default(),
            vec![record("A", 10, 1)],
            vec![AppFailure {
                name: "B".to_string(),
                reason: "no builds available".to_string(),
            }],
        );
        assert_eq!(report.install_pages.get("A").unwrap(), "https://i.app/A");
        assert!(!report.install_pages.contains_key("B"));
        assert_eq!(report.failed_names(), vec!["B"]);
        assert_eq!(report.summary(), "1/2 apps captured; failed: B");
    }

    #[test]
    fn test_workflow_reports_keep_run_order_through_json() {
        let mut reports = WorkflowReports::new();
        reports.insert("uat".to_string(), RunReport::new(BuildFilter::default(), vec![], vec![]));
        reports.insert("qa".to_string(), RunReport::new(BuildFilter::default(), vec![], vec![]));
        reports.insert(
            "uat".to_string(),
            RunReport::new(BuildFilter::default(), vec![record("A", 10, 1)], vec![]),
        );
        assert_eq!(reports.workflows(), vec!["uat", "qa"]);
        assert_eq!(reports["uat"].succeeded(), 1);

        let json = serde_json::to_string(&reports).unwrap();
        assert!(json.find("\"uat\"").unwrap() < json.find("\"qa\"").unwrap());
        let back: WorkflowReports = serde_json::from_str(&json).unwrap();
        assert_eq!(back.workflows(), vec!["uat", "qa"]);
        assert_eq!(back, reports);
    }
}
