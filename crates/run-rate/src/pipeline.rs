//! Report pipeline - orchestrates the fetch-aggregate-format-notify flow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use run_rate_cost::{
    AccountDirectory, CostAggregator, CostExplorerApi, CostRecord, CostTotals, DirectoryFetcher,
    Granularity, ListingMode, OrganizationsApi, DEFAULT_PAGE_SIZE,
};
use run_rate_notify::{Notifier, ReportMessage, DEFAULT_TITLE};

use crate::error::RunRateError;
use crate::report::{Report, ReportKind};

/// Configuration for the report pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Figures the report carries.
    pub report: ReportKind,
    /// Bold title line of the chat message.
    pub title: String,
    /// `ListAccounts` page size.
    pub page_size: i32,
    /// How far to follow account pagination.
    pub listing_mode: ListingMode,
    /// Request only `AmortizedCost` instead of the full metric set.
    pub amortized_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            report: ReportKind::default(),
            title: DEFAULT_TITLE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            listing_mode: ListingMode::default(),
            amortized_only: false,
        }
    }
}

/// Result of a single run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The ranked report that was sent.
    pub report: Report,
    /// The rendered table.
    pub table: String,
}

impl RunSummary {
    /// Number of accounts in the report.
    #[must_use]
    pub fn accounts(&self) -> usize {
        self.report.rows().len()
    }
}

/// Report pipeline orchestrator.
pub struct Pipeline {
    config: PipelineConfig,
    organizations: Arc<dyn OrganizationsApi>,
    cost_explorer: Arc<dyn CostExplorerApi>,
    notifier: Notifier,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        organizations: Arc<dyn OrganizationsApi>,
        cost_explorer: Arc<dyn CostExplorerApi>,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            organizations,
            cost_explorer,
            notifier,
        }
    }

    /// Run once: list accounts, sum costs, render, send.
    ///
    /// Any stage failing aborts the run before anything is sent.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, RunRateError> {
        tracing::info!(report = ?self.config.report, "Starting report run");

        let directory = DirectoryFetcher::new(self.organizations.clone())
            .with_page_size(self.config.page_size)
            .with_mode(self.config.listing_mode)
            .fetch()
            .await?;

        let (daily, monthly) = self.query_costs(now).await?;
        log_unlisted(&directory, &daily.records(Granularity::Daily));
        log_unlisted(&directory, &monthly.records(Granularity::Monthly));

        let report = Report::build(self.config.report, &directory, &daily, &monthly);
        let table = report.render()?;
        tracing::debug!(table = %table, "Rendered report");

        self.notifier
            .send(&ReportMessage::new(self.config.title.clone(), table.clone()))
            .await?;

        let (day_total, month_total) = report.totals();
        tracing::info!(
            accounts = report.rows().len(),
            day_total,
            month_total,
            "Report run complete"
        );

        Ok(RunSummary { report, table })
    }

    /// Query the granularities the report needs.
    ///
    /// The two queries of a daily-and-monthly report are independent and run
    /// concurrently.
    async fn query_costs(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(CostTotals, CostTotals), RunRateError> {
        let mut aggregator = CostAggregator::new(self.cost_explorer.clone());
        if self.config.amortized_only {
            aggregator = aggregator.amortized_only();
        }

        let totals = match self.config.report {
            ReportKind::DailyAndMonthly => tokio::try_join!(
                aggregator.aggregate(Granularity::Daily, now),
                aggregator.aggregate(Granularity::Monthly, now),
            )?,
            ReportKind::DailyOnly => (
                aggregator.aggregate(Granularity::Daily, now).await?,
                CostTotals::new(),
            ),
            ReportKind::MonthlyOnly => (
                CostTotals::new(),
                aggregator.aggregate(Granularity::Monthly, now).await?,
            ),
        };

        Ok(totals)
    }
}

/// Records for accounts outside the listed directory, which the report leaves out.
fn unlisted<'a>(directory: &AccountDirectory, records: &'a [CostRecord]) -> Vec<&'a CostRecord> {
    records
        .iter()
        .filter(|record| !directory.contains(&record.account_id))
        .collect()
}

fn log_unlisted(directory: &AccountDirectory, records: &[CostRecord]) {
    for record in unlisted(directory, records) {
        tracing::debug!(
            account_id = %record.account_id,
            granularity = %record.granularity,
            amount = record.amount,
            "Cost for account missing from the directory"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_rate_cost::Account;

    #[test]
    fn test_unlisted_records_exclude_directory_accounts() {
        let directory: AccountDirectory = vec![Account::new("111", "Alpha")].into_iter().collect();
        let totals: CostTotals = [("111", 4.0), ("999", 2.5), ("888", 1.0)]
            .into_iter()
            .collect();
        let records = totals.records(Granularity::Monthly);

        let ids: Vec<&str> = unlisted(&directory, &records)
            .iter()
            .map(|record| record.account_id.as_str())
            .collect();
        assert_eq!(ids, vec!["888", "999"]);
    }

    #[test]
    fn test_default_config_reports_daily_and_monthly() {
        let config = PipelineConfig::default();
        assert_eq!(config.report, ReportKind::DailyAndMonthly);
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.listing_mode, ListingMode::AllPages);
    }
}
