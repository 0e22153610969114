//! GitHub API client.
//!
//! Unauthenticated, read-only access to two endpoints: the public repo
//! listing for a user and the latest workflow run for a repository. The
//! [`GithubApi`] trait is the seam the report driver works against so the
//! fan-out machinery can be exercised with a mock in tests.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::error::{GhStatusError, Result};

/// GitHub API base URL
const GITHUB_API_URL: &str = "https://api.github.com";

/// Repositories requested per listing page; a shorter page ends pagination
const PER_PAGE: usize = 100;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub rejects requests without a User-Agent
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Reduced view of a repository's most recent workflow run.
///
/// Fetch failures are variants rather than errors because the driver must
/// keep processing sibling repositories regardless of individual outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The latest run carries a conclusion; the label joins status and conclusion.
    Completed { status: String, conclusion: String },
    /// The latest run has no conclusion yet (in_progress, queued, waiting, ...).
    InFlight { status: String },
    /// The repository has no recorded workflow runs.
    NoRuns,
    /// API quota exhausted.
    RateLimited,
    /// Any other HTTP or transport failure.
    FetchError,
}

impl RunStatus {
    /// Display label for statuses that go through the icon classifier.
    ///
    /// `NoRuns`, `RateLimited` and `FetchError` render fixed text instead
    /// and return `None` here.
    pub fn label(&self) -> Option<String> {
        match self {
            RunStatus::Completed { status, conclusion } => {
                Some(format!("{status} {conclusion}"))
            }
            RunStatus::InFlight { status } => Some(status.clone()),
            _ => None,
        }
    }
}

/// Repository record from the listing endpoint; only `full_name` is consumed.
#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
}

/// Response envelope of the workflow-runs endpoint.
#[derive(Debug, Deserialize)]
struct RunsResponse {
    #[serde(default)]
    workflow_runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct Run {
    #[serde(default)]
    status: String,
    conclusion: Option<String>,
}

/// Read-only GitHub operations used by the report driver.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// List all public repositories for `user` as `owner/name` strings.
    ///
    /// Fails atomically: a mid-pagination error discards pages already
    /// collected for this user.
    async fn list_repositories(&self, user: &str) -> Result<Vec<String>>;

    /// Fetch the most recent workflow run status for `repo` (`owner/name`).
    async fn fetch_status(&self, repo: &str) -> RunStatus;
}

/// reqwest-backed [`GithubApi`] implementation.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl GithubClient {
    /// Create a client against the real GitHub API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL)
    }

    /// Create a client against an alternate base URL (mock servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Quota exhaustion is signalled as 403 plus a literal "0" remaining-quota
    /// header; a 403 without that header is a generic fetch error.
    fn is_rate_limited(response: &Response) -> bool {
        response.status() == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|value| value.to_str().ok())
                == Some("0")
    }

    /// GET `url` and classify the response status before returning it.
    async fn get_checked(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;

        if Self::is_rate_limited(&response) {
            return Err(GhStatusError::RateLimited);
        }
        if response.status() != StatusCode::OK {
            return Err(GhStatusError::Status(response.status()));
        }

        Ok(response)
    }

    async fn latest_run(&self, repo: &str) -> Result<Option<Run>> {
        let url = format!("{}/repos/{}/actions/runs?per_page=1", self.base_url, repo);
        let runs: RunsResponse = self.get_checked(&url).await?.json().await?;
        Ok(runs.workflow_runs.into_iter().next())
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn list_repositories(&self, user: &str) -> Result<Vec<String>> {
        let mut repos = Vec::new();
        let mut page = 1;

        // Terminates on the first short page. There is no cap on page count;
        // a server that always reports full pages would loop forever.
        loop {
            let url = format!(
                "{}/users/{}/repos?per_page={}&type=public&page={}",
                self.base_url, user, PER_PAGE, page
            );
            let records: Vec<Repo> = self.get_checked(&url).await?.json().await?;
            let count = records.len();

            debug!("listed page {} for {}: {} repos", page, user, count);
            repos.extend(records.into_iter().map(|repo| repo.full_name));

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }

    async fn fetch_status(&self, repo: &str) -> RunStatus {
        match self.latest_run(repo).await {
            Ok(Some(run)) => match run.conclusion {
                Some(conclusion) if !conclusion.is_empty() => RunStatus::Completed {
                    status: run.status,
                    conclusion,
                },
                _ => RunStatus::InFlight { status: run.status },
            },
            Ok(None) => RunStatus::NoRuns,
            Err(GhStatusError::RateLimited) => RunStatus::RateLimited,
            Err(err) => {
                debug!("status fetch for {} failed: {}", repo, err);
                RunStatus::FetchError
            }
        }
    }
}
