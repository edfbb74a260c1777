//! Provider traits and common types.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while listing the organization's accounts.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Organizations API call failed (permissions, network, throttling).
    #[error("Organizations API error: {0}")]
    Api(String),

    /// Invalid fetcher configuration.
    #[error("Invalid directory configuration: {0}")]
    Config(String),
}

/// Errors that can occur while querying and summing costs.
#[derive(Error, Debug)]
pub enum CostQueryError {
    /// Cost Explorer API call failed.
    #[error("Cost Explorer API error: {0}")]
    Api(String),

    /// The requested time period could not be expressed as a query.
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// A result group carried no linked account key.
    #[error("Cost group has no linked account key")]
    MissingGroupKey,

    /// The consumed metric was absent from a result group.
    #[error("Metric {metric} missing for account {account_id}")]
    MissingMetric {
        metric: CostMetric,
        account_id: String,
    },

    /// The metric amount was not a finite decimal number.
    #[error("Invalid {metric} amount {amount:?} for account {account_id}")]
    InvalidAmount {
        metric: CostMetric,
        account_id: String,
        amount: String,
    },
}

// ============================================================================
// Accounts
// ============================================================================

/// A member account of the organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Opaque account identifier (12-digit AWS account id).
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Account {
    /// Create a new account.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One page of a `ListAccounts` response.
#[derive(Debug, Clone, Default)]
pub struct AccountPage {
    /// Accounts on this page, in API order.
    pub accounts: Vec<Account>,
    /// Token for the next page, if any.
    pub next_token: Option<String>,
}

// ============================================================================
// Time windows
// ============================================================================

/// Reporting granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// The last 24 hours, at date precision.
    Daily,
    /// Month to date.
    Monthly,
}

impl Granularity {
    /// Compute the query window for this granularity relative to `now`.
    ///
    /// Both ends are UTC calendar dates. The end date is exclusive, the way
    /// Cost Explorer interprets `TimePeriod.End`.
    #[must_use]
    pub fn window(self, now: DateTime<Utc>) -> TimeWindow {
        let today = now.date_naive();
        let start = match self {
            Self::Daily => (now - Duration::hours(24)).date_naive(),
            Self::Monthly => today - Duration::days(i64::from(today.day0())),
        };
        TimeWindow { start, end: today }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Monthly => write!(f, "MONTHLY"),
        }
    }
}

/// A date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// First date included.
    pub start: NaiveDate,
    /// First date excluded.
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Whether the window covers no days at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Start date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start_date(), self.end_date())
    }
}

// ============================================================================
// Cost query types
// ============================================================================

/// Cost Explorer metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostMetric {
    AmortizedCost,
    BlendedCost,
    NetAmortizedCost,
    NetUnblendedCost,
    NormalizedUsageAmount,
    UnblendedCost,
    UsageQuantity,
}

impl CostMetric {
    /// Every metric Cost Explorer can return for a grouped query.
    pub const ALL: [Self; 7] = [
        Self::AmortizedCost,
        Self::BlendedCost,
        Self::NetAmortizedCost,
        Self::NetUnblendedCost,
        Self::NormalizedUsageAmount,
        Self::UnblendedCost,
        Self::UsageQuantity,
    ];

    /// Wire name of the metric.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AmortizedCost => "AmortizedCost",
            Self::BlendedCost => "BlendedCost",
            Self::NetAmortizedCost => "NetAmortizedCost",
            Self::NetUnblendedCost => "NetUnblendedCost",
            Self::NormalizedUsageAmount => "NormalizedUsageAmount",
            Self::UnblendedCost => "UnblendedCost",
            Self::UsageQuantity => "UsageQuantity",
        }
    }
}

impl std::fmt::Display for CostMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request for one page of linked-account grouped costs.
///
/// The API granularity is always daily; monthly figures are produced by
/// summing the daily buckets over the month-to-date window.
#[derive(Debug, Clone)]
pub struct CostQuery {
    /// Date interval to query.
    pub time_period: TimeWindow,
    /// Metrics to request.
    pub metrics: Vec<CostMetric>,
    /// Pagination cursor.
    pub next_page_token: Option<String>,
}

/// A summed cost for one account at one granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRecord {
    pub account_id: String,
    pub granularity: Granularity,
    pub amount: f64,
}

// ============================================================================
// Cost response schema
// ============================================================================

/// One page of a `GetCostAndUsage` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostPage {
    /// Time buckets returned on this page.
    #[serde(default)]
    pub results_by_time: Vec<ResultByTime>,
    /// Token for the next page, if any.
    pub next_page_token: Option<String>,
}

/// A single time bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultByTime {
    /// Per-account groups within the bucket.
    #[serde(default)]
    pub groups: Vec<CostGroup>,
}

/// Costs for one group key (linked account) within a bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostGroup {
    /// Group keys; the first is the linked account id.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Metric name to value.
    #[serde(default)]
    pub metrics: HashMap<String, MetricValue>,
}

/// A metric amount as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    /// Decimal amount encoded as a string.
    pub amount: Option<String>,
    /// Unit, e.g. "USD".
    pub unit: Option<String>,
}

impl CostGroup {
    /// Linked account id of this group.
    ///
    /// # Errors
    ///
    /// Returns [`CostQueryError::MissingGroupKey`] if the group has no keys.
    pub fn account_id(&self) -> Result<&str, CostQueryError> {
        self.keys
            .first()
            .map(String::as_str)
            .ok_or(CostQueryError::MissingGroupKey)
    }

    /// Parse the amount of `metric` for this group.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric is absent or its amount is not a
    /// finite number.
    pub fn amount(&self, metric: CostMetric) -> Result<f64, CostQueryError> {
        let account_id = self.account_id()?;
        let raw = self
            .metrics
            .get(metric.as_str())
            .and_then(|value| value.amount.as_deref())
            .ok_or_else(|| CostQueryError::MissingMetric {
                metric,
                account_id: account_id.to_string(),
            })?;

        raw.parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| CostQueryError::InvalidAmount {
                metric,
                account_id: account_id.to_string(),
                amount: raw.to_string(),
            })
    }
}

// ============================================================================
// Provider traits
// ============================================================================

/// Access to the organization's account listing.
#[async_trait]
pub trait OrganizationsApi: Send + Sync {
    /// Get the provider name (e.g., "aws-organizations").
    fn name(&self) -> &'static str;

    /// Fetch one page of accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    async fn list_accounts(
        &self,
        max_results: i32,
        next_token: Option<String>,
    ) -> Result<AccountPage, DirectoryError>;
}

/// Access to grouped cost and usage data.
#[async_trait]
pub trait CostExplorerApi: Send + Sync {
    /// Get the provider name (e.g., "aws-cost-explorer").
    fn name(&self) -> &'static str;

    /// Fetch one page of linked-account grouped costs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<CostPage, CostQueryError>;
}
