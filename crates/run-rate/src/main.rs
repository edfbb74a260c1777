//! run-rate CLI - post AWS spend per account to Slack.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*};

use run_rate::{report_outcome, Cli, Pipeline, RunSummary};
use run_rate_cost::providers::aws::load_sdk_config;
use run_rate_cost::{AwsCostExplorer, AwsOrganizations};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = run(&cli).await;
    ExitCode::from(report_outcome(&result, &mut std::io::stderr()))
}

fn init_tracing(cli: &Cli) {
    let registry = tracing_subscriber::registry().with(cli.log_filter());

    // Logs go to stderr so stdout only ever carries the dry-run table.
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let sdk_config = load_sdk_config(cli.region.clone()).await;
    tracing::debug!(region = ?sdk_config.region(), "Loaded AWS configuration");

    let pipeline = Pipeline::new(
        cli.pipeline_config(),
        Arc::new(AwsOrganizations::new(&sdk_config)),
        Arc::new(AwsCostExplorer::new(&sdk_config)),
        cli.notifier(),
    );

    let summary = pipeline.run(Utc::now()).await?;

    if cli.dry_run {
        println!("{}", summary.table);
    }

    Ok(summary)
}
