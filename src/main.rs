use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use log::info;

mod cli;

use cli::Cli;
use ghstatus::github::GithubClient;
use ghstatus::report::{self, ReportSink};

fn setup_logging() {
    // Logs go to stderr gated by RUST_LOG; report lines own stdout.
    env_logger::Builder::from_default_env().init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    info!("starting run for users: {:?}", cli.users);

    let api = Arc::new(GithubClient::new().context("Failed to create GitHub client")?);
    let sink = ReportSink::stdout();

    // An interrupt stops issuing requests and exits quietly; nothing
    // persistent needs cleanup.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
        _ = report::run_report(api, &cli.users, cli.concurrency, &sink) => {}
    }

    Ok(())
}
