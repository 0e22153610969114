//! Report driver and fan-out scheduler.
//!
//! Listing is sequential per user; the status-fetch phase fans out with a
//! semaphore-bounded task per repository. Output goes through [`ReportSink`]
//! so concurrent tasks emit whole lines, never interleaved fragments, and
//! tests can capture the report instead of scraping stdout.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use log::{info, warn};
use tokio::sync::Semaphore;

use crate::github::{GithubApi, RunStatus};
use crate::icons::{icon_for, DEFAULT_ICON, WARN_ICON};

/// Line-atomic output sink shared by concurrent fetch tasks.
#[derive(Clone)]
pub struct ReportSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ReportSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Sink writing into a shared buffer, for asserting on report output.
    pub fn capture() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Self::new(Box::new(SharedBuffer(Arc::clone(&buffer))));
        (sink, buffer)
    }

    /// Write one fully-formed line. The lock is held for the whole line,
    /// which is the only exclusion the output contract needs.
    pub fn line(&self, line: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render the console line for one repository's fetch outcome.
fn status_line(repo: &str, status: &RunStatus) -> String {
    match status.label() {
        Some(label) => format!("{} {} - {}", icon_for(&label), repo, label),
        None => match status {
            RunStatus::NoRuns => format!("{DEFAULT_ICON} {repo} - no_runs"),
            RunStatus::RateLimited => format!("{WARN_ICON}  {repo} - rate limit exceeded"),
            _ => format!("{WARN_ICON}  {repo} - error fetching status"),
        },
    }
}

/// Fetch statuses for `repos` with at most `limit` requests in flight,
/// emitting each repository's line as its fetch completes.
///
/// Completion order is unordered; every line is self-labelled with its
/// repository name. Returns only when every task has finished.
pub async fn fan_out(
    api: Arc<dyn GithubApi>,
    repos: Vec<String>,
    limit: usize,
    sink: &ReportSink,
) {
    // Clamped so a zero ceiling cannot deadlock the gate.
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = Vec::with_capacity(repos.len());

    for repo in repos {
        let api = Arc::clone(&api);
        let semaphore = Arc::clone(&semaphore);
        let sink = sink.clone();

        tasks.push(tokio::spawn(async move {
            // Permit held until the task returns, failure included.
            let _permit = semaphore.acquire_owned().await.ok();
            let status = api.fetch_status(&repo).await;
            sink.line(&status_line(&repo, &status));
        }));
    }

    join_all(tasks).await;
}

/// Produce the full report: list every user's repositories sequentially,
/// then fan out status fetches over the aggregate.
///
/// A user whose listing fails gets one warning line and does not abort the
/// run. An empty aggregate prints a single notice and is not an error.
pub async fn run_report(
    api: Arc<dyn GithubApi>,
    users: &[String],
    concurrency: usize,
    sink: &ReportSink,
) {
    let mut repos = Vec::new();

    for user in users {
        match api.list_repositories(user).await {
            Ok(listed) => {
                info!("{}: {} repositories", user, listed.len());
                repos.extend(listed);
            }
            Err(err) => {
                warn!("listing repositories for {} failed: {}", user, err);
                sink.line(&format!("{WARN_ICON}  {user}: {err}"));
            }
        }
    }

    if repos.is_empty() {
        sink.line("No repositories found");
        return;
    }

    info!(
        "fetching status for {} repositories (concurrency {})",
        repos.len(),
        concurrency
    );
    fan_out(api, repos, concurrency, sink).await;
}
