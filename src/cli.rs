//! CLI definition using clap.

use clap::Parser;

/// GitHub Actions build monitor - latest workflow status per public repo
#[derive(Parser, Debug)]
#[command(name = "ghstatus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Maximum number of concurrent status fetches
    #[arg(short, long, default_value_t = 5)]
    pub concurrency: usize,

    /// GitHub usernames to report on
    #[arg(required = true)]
    pub users: Vec<String>,
}
