//! Report driver and fan-out scheduler tests.
//!
//! The scheduler properties (concurrency ceiling, resilience to per-user
//! listing failures, empty aggregate) run against a mock `GithubApi`; the
//! end-to-end scenario runs the real client against a mocked backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ghstatus::error::{GhStatusError, Result};
use ghstatus::github::{GithubApi, GithubClient, RunStatus};
use ghstatus::report::{ReportSink, run_report};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

enum Listing {
    Repos(Vec<&'static str>),
    Fails,
}

/// GithubApi double that records the high-water mark of concurrent
/// status fetches.
struct MockApi {
    listings: Vec<(&'static str, Listing)>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockApi {
    fn new(listings: Vec<(&'static str, Listing)>) -> Arc<Self> {
        Arc::new(Self {
            listings,
            delay: Duration::from_millis(20),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl GithubApi for MockApi {
    async fn list_repositories(&self, user: &str) -> Result<Vec<String>> {
        match self.listings.iter().find(|(name, _)| *name == user) {
            Some((_, Listing::Repos(repos))) => {
                Ok(repos.iter().map(|repo| repo.to_string()).collect())
            }
            Some((_, Listing::Fails)) => {
                Err(GhStatusError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_status(&self, _repo: &str) -> RunStatus {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        RunStatus::Completed {
            status: "completed".to_string(),
            conclusion: "success".to_string(),
        }
    }
}

fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}

/// With 20 repositories and a ceiling of 3, no more than 3 fetches are
/// ever outstanding at once, and every repository still gets its line.
#[tokio::test]
async fn test_concurrency_ceiling_is_enforced() {
    let repos: Vec<&'static str> = vec![
        "octo/r00", "octo/r01", "octo/r02", "octo/r03", "octo/r04", "octo/r05", "octo/r06",
        "octo/r07", "octo/r08", "octo/r09", "octo/r10", "octo/r11", "octo/r12", "octo/r13",
        "octo/r14", "octo/r15", "octo/r16", "octo/r17", "octo/r18", "octo/r19",
    ];
    let api = MockApi::new(vec![("octo", Listing::Repos(repos))]);
    let (sink, buffer) = ReportSink::capture();

    run_report(api.clone(), &["octo".to_string()], 3, &sink).await;

    assert!(api.max_in_flight.load(Ordering::SeqCst) <= 3);
    assert_eq!(api.in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(captured(&buffer).lines().count(), 20);
}

/// One user's listing failure yields exactly one warning line and does not
/// disturb the other users' reports.
#[tokio::test]
async fn test_listing_failure_does_not_abort_run() {
    let api = MockApi::new(vec![
        ("usera", Listing::Repos(vec!["usera/one", "usera/two"])),
        ("userb", Listing::Fails),
        ("userc", Listing::Repos(vec!["userc/three"])),
    ]);
    let users = vec![
        "usera".to_string(),
        "userb".to_string(),
        "userc".to_string(),
    ];
    let (sink, buffer) = ReportSink::capture();

    run_report(api, &users, 5, &sink).await;

    let output = captured(&buffer);
    assert!(output.contains("usera/one"));
    assert!(output.contains("usera/two"));
    assert!(output.contains("userc/three"));

    let warnings: Vec<&str> = output.lines().filter(|line| line.starts_with("⚠️")).collect();
    assert_eq!(
        warnings,
        vec!["⚠️  userb: request failed with status 500 Internal Server Error"]
    );
    assert_eq!(output.lines().count(), 4);
}

/// A user with zero repositories produces only the empty notice.
#[tokio::test]
async fn test_no_repositories_found() {
    let api = MockApi::new(vec![("octo", Listing::Repos(vec![]))]);
    let (sink, buffer) = ReportSink::capture();

    run_report(api, &["octo".to_string()], 5, &sink).await;

    assert_eq!(captured(&buffer), "No repositories found\n");
}

/// All-users-failed also leaves an empty aggregate: warnings first, then
/// the empty notice, and no fetch phase.
#[tokio::test]
async fn test_all_listings_failed_prints_empty_notice() {
    let api = MockApi::new(vec![("usera", Listing::Fails), ("userb", Listing::Fails)]);
    let (sink, buffer) = ReportSink::capture();

    run_report(api, &["usera".to_string(), "userb".to_string()], 5, &sink).await;

    let output = captured(&buffer);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("⚠️  usera:"));
    assert!(lines[1].starts_with("⚠️  userb:"));
    assert_eq!(lines[2], "No repositories found");
}

/// End-to-end against a mocked backend: one repo with a successful run,
/// one repo with no runs at all.
#[tokio::test]
async fn test_end_to_end_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octo/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "full_name": "octo/a" },
            { "full_name": "octo/b" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/a/actions/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "workflow_runs": [{ "status": "completed", "conclusion": "success" }] }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/b/actions/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [] })))
        .mount(&server)
        .await;

    let api = Arc::new(GithubClient::with_base_url(server.uri()).unwrap());
    let (sink, buffer) = ReportSink::capture();

    run_report(api, &["octo".to_string()], 5, &sink).await;

    let output = captured(&buffer);
    assert!(output.contains("✅ octo/a - completed success"));
    assert!(output.contains("➖ octo/b - no_runs"));
    assert_eq!(output.lines().count(), 2);
}
