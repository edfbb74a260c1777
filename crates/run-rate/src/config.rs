//! Command-line and environment configuration.
//!
//! Everything is resolved once at startup. Running with no flags and only
//! `SLACK_WEBHOOK_URL` set produces the default daily-and-monthly report.

use std::sync::Arc;

use clap::Parser;
use run_rate_cost::{ListingMode, DEFAULT_PAGE_SIZE};
use run_rate_notify::{Notifier, NotifyChannel, SlackChannel, DEFAULT_TITLE};
use tracing_subscriber::EnvFilter;

use crate::pipeline::PipelineConfig;
use crate::report::ReportKind;

/// Post a ranked AWS cost-per-account table to Slack.
#[derive(Parser, Debug, Clone)]
#[command(name = "run-rate")]
#[command(about = "Post daily and month-to-date AWS spend per account to Slack")]
#[command(version)]
pub struct Cli {
    /// Slack incoming-webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", default_value = "", hide_env_values = true)]
    pub webhook_url: String,

    /// Figures to report
    #[arg(long, env = "RUN_RATE_REPORT", value_enum, default_value = "daily-and-monthly")]
    pub report: ReportKind,

    /// Bold title line of the message
    #[arg(long, env = "RUN_RATE_TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Accounts requested per ListAccounts page
    #[arg(
        long,
        env = "RUN_RATE_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(i32).range(1..=20)
    )]
    pub page_size: i32,

    /// Only list the first page of accounts
    #[arg(long, env = "RUN_RATE_FIRST_PAGE_ONLY")]
    pub first_page_only: bool,

    /// Request only AmortizedCost instead of the full metric set
    #[arg(long, env = "RUN_RATE_AMORTIZED_ONLY")]
    pub amortized_only: bool,

    /// Fail when the webhook answers with a non-2xx status
    #[arg(long, env = "RUN_RATE_REQUIRE_SUCCESS")]
    pub require_success: bool,

    /// Print the table instead of posting it
    #[arg(long, env = "RUN_RATE_DRY_RUN")]
    pub dry_run: bool,

    /// AWS region override for the API clients
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "RUN_RATE_JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    /// Pipeline settings derived from the flags.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            report: self.report,
            title: self.title.clone(),
            page_size: self.page_size,
            listing_mode: if self.first_page_only {
                ListingMode::FirstPage
            } else {
                ListingMode::AllPages
            },
            amortized_only: self.amortized_only,
        }
    }

    /// Build the notifier for the configured webhook.
    #[must_use]
    pub fn notifier(&self) -> Notifier {
        if self.dry_run {
            return Notifier::dry_run();
        }

        let slack = SlackChannel::new(self.webhook_url.clone()).require_success(self.require_success);
        let channels: Vec<Arc<dyn NotifyChannel>> = vec![Arc::new(slack)];
        Notifier::with_channels(channels)
    }

    /// Log filter: `RUST_LOG` when set, otherwise by verbosity.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if self.verbose {
                EnvFilter::new("run_rate=debug,run_rate_cost=debug,run_rate_notify=debug,info")
            } else {
                EnvFilter::new("run_rate=info,run_rate_cost=info,run_rate_notify=info,warn")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_pipeline_config() {
        let cli = Cli::try_parse_from([
            "run-rate",
            "--webhook-url",
            "https://hooks.example/T/B/X",
            "--report",
            "monthly-only",
            "--title",
            "Spend",
            "--page-size",
            "10",
            "--first-page-only",
            "--amortized-only",
        ])
        .unwrap();

        let config = cli.pipeline_config();
        assert_eq!(config.report, ReportKind::MonthlyOnly);
        assert_eq!(config.title, "Spend");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.listing_mode, ListingMode::FirstPage);
        assert!(config.amortized_only);
        assert_eq!(cli.notifier().channel_count(), 1);
    }

    #[test]
    fn test_page_size_bounded() {
        let result = Cli::try_parse_from(["run-rate", "--page-size", "21"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dry_run_builds_logging_notifier() {
        let cli = Cli::try_parse_from(["run-rate", "--dry-run"]).unwrap();
        let notifier = cli.notifier();
        assert!(notifier.is_dry_run());
        assert_eq!(notifier.channel_count(), 0);
    }

    #[test]
    fn test_unknown_report_kind_rejected() {
        assert!(Cli::try_parse_from(["run-rate", "--report", "weekly"]).is_err());
    }
}
