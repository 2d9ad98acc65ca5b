use chrono::{DateTime, TimeZone, Utc};

use installpages::ci::fakes::{FailPoint, MemoryCi};
use installpages::ci::{Application, Artifact, ArtifactInfo, Build, BuildStatus};
use installpages::pipeline::{run_all, BuildFilter, RunReport};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn app(slug: &str) -> Application {
    Application {
        app_slug: slug.to_string(),
        name: format!("App {}", slug),
    }
}

/// Register one successful qa build finishing on `day` for `slug`.
fn with_app(api: MemoryCi, slug: &str, day: u32) -> MemoryCi {
    let build_slug = format!("{}-build", slug);
    api.with_builds(
        slug,
        vec![Build {
            slug: build_slug.clone(),
            triggered_workflow: "qa".to_string(),
            status: BuildStatus::Success,
            triggered_at: at(day, 8),
            finished_at: Some(at(day, 9)),
            build_number: day as u64,
        }],
    )
    .with_artifacts(
        slug,
        &build_slug,
        vec![
            Artifact {
                slug: "private".to_string(),
                is_public_page_enabled: false,
            },
            Artifact {
                slug: "public".to_string(),
                is_public_page_enabled: true,
            },
        ],
    )
    .with_info(
        slug,
        &build_slug,
        "public",
        ArtifactInfo {
            public_install_page_url: Some(format!("https://i.app/{}", slug)),
            ..Default::default()
        },
    )
}

fn qa() -> BuildFilter {
    BuildFilter::new(Some("qa".to_string()), Some(BuildStatus::Success))
}

async fn run(api: &MemoryCi, slugs: &[&str]) -> RunReport {
    let apps: Vec<Application> = slugs.iter().map(|s| app(s)).collect();
    run_all(api, &apps, &qa()).await
}

#[tokio::test]
async fn transport_failure_at_each_step_is_isolated() {
    for point in [FailPoint::Builds, FailPoint::Artifacts, FailPoint::ArtifactInfo] {
        let api = with_app(with_app(with_app(MemoryCi::new(), "a", 10), "b", 10), "c", 10)
            .failing("b", point);
        let report = run(&api, &["a", "b", "c"]).await;

        assert_eq!(report.failed_names(), vec!["App b"], "fail point {:?}", point);
        assert!(report.failures[0].reason.contains("503"), "{}", report.failures[0].reason);
        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["App a", "App c"]);
        assert!(!report.install_pages.contains_key("App b"));
        // The app after the failure was still fully processed.
        assert!(api.calls().contains(&"artifact_info:c/c-build/public".to_string()));
    }
}

#[tokio::test]
async fn same_day_builds_have_no_warning() {
    let api = with_app(with_app(MemoryCi::new(), "a", 10), "b", 10);
    let report = run(&api, &["a", "b"]).await;
    assert_eq!(report.records.len(), 2);
    assert!(!report.has_date_mismatch());
}

#[tokio::test]
async fn different_day_builds_warn() {
    let api = with_app(with_app(MemoryCi::new(), "a", 10), "b", 11);
    let report = run(&api, &["a", "b"]).await;
    assert_eq!(report.records.len(), 2);
    assert!(report.has_date_mismatch());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn failures_are_never_partial_records() {
    let api = with_app(MemoryCi::new(), "a", 10).with_artifacts(
        "a",
        "a-build",
        vec![Artifact {
            slug: "private".to_string(),
            is_public_page_enabled: false,
        }],
    );
    let report = run(&api, &["a", "missing"]).await;
    assert!(report.records.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].reason.contains("public install page"));
    assert!(report.failures[1].reason.contains("no builds available"));
    assert_eq!(report.summary(), "0/2 apps captured; failed: App a, App missing");
}

#[tokio::test]
async fn apps_are_processed_in_order_one_at_a_time() {
    let api = with_app(with_app(MemoryCi::new(), "a", 10), "b", 10);
    run(&api, &["b", "a"]).await;
    assert_eq!(
        api.calls(),
        vec![
            "builds:b",
            "artifacts:b/b-build",
            "artifact_info:b/b-build/public",
            "builds:a",
            "artifacts:a/a-build",
            "artifact_info:a/a-build/public",
        ]
    );
}
