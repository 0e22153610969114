//! ghstatus - GitHub Actions build monitor
//!
//! Fetches the public repositories of the given GitHub users and reports
//! the latest workflow run status for each repository, one icon-prefixed
//! line per repo.

pub mod error;
pub mod github;
pub mod icons;
pub mod report;

pub use error::{GhStatusError, Result};
