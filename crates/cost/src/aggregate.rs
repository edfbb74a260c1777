//! Per-account cost aggregation over Cost Explorer pages.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::providers::{
    CostExplorerApi, CostMetric, CostPage, CostQuery, CostQueryError, CostRecord, Granularity,
    TimeWindow,
};

/// Summed cost per linked account for one granularity.
///
/// Accounts that never received a positive contribution are absent and read
/// as `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTotals {
    totals: HashMap<String, f64>,
}

impl CostTotals {
    /// Create empty totals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total for `account_id`, `0.0` when absent.
    #[must_use]
    pub fn get(&self, account_id: &str) -> f64 {
        self.totals.get(account_id).copied().unwrap_or(0.0)
    }

    /// Add `amount` to `account_id` if it is positive.
    ///
    /// Returns whether the amount was counted.
    pub fn add_positive(&mut self, account_id: &str, amount: f64) -> bool {
        if amount > 0.0 {
            *self.totals.entry(account_id.to_string()).or_insert(0.0) += amount;
            true
        } else {
            false
        }
    }

    /// Number of accounts with a recorded total.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether no account has a recorded total.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum over all accounts.
    #[must_use]
    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Convert to records sorted by account id.
    #[must_use]
    pub fn records(&self, granularity: Granularity) -> Vec<CostRecord> {
        let mut records: Vec<CostRecord> = self
            .totals
            .iter()
            .map(|(account_id, amount)| CostRecord {
                account_id: account_id.clone(),
                granularity,
                amount: *amount,
            })
            .collect();
        records.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        records
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for CostTotals {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut totals = Self::new();
        for (account_id, amount) in iter {
            totals.add_positive(&account_id.into(), amount);
        }
        totals
    }
}

/// Queries Cost Explorer and sums amortized cost per linked account.
pub struct CostAggregator {
    api: Arc<dyn CostExplorerApi>,
    metrics: Vec<CostMetric>,
}

impl CostAggregator {
    /// Metric summed into the totals.
    pub const CONSUMED_METRIC: CostMetric = CostMetric::AmortizedCost;

    /// Create an aggregator that requests the full metric set.
    #[must_use]
    pub fn new(api: Arc<dyn CostExplorerApi>) -> Self {
        Self {
            api,
            metrics: CostMetric::ALL.to_vec(),
        }
    }

    /// Request only the consumed metric instead of the full set.
    #[must_use]
    pub fn amortized_only(mut self) -> Self {
        self.metrics = vec![Self::CONSUMED_METRIC];
        self
    }

    /// Metrics each query requests.
    #[must_use]
    pub fn metrics(&self) -> &[CostMetric] {
        &self.metrics
    }

    /// Sum costs per account over the window `granularity` covers at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CostQueryError`] if any page request fails or any group on
    /// any page carries a missing or malformed amount. No partial totals are
    /// returned.
    pub async fn aggregate(
        &self,
        granularity: Granularity,
        now: DateTime<Utc>,
    ) -> Result<CostTotals, CostQueryError> {
        let window = granularity.window(now);
        info!(%granularity, %window, "Aggregating costs");
        self.aggregate_window(window).await
    }

    /// Sum costs per account over `window`, following every page.
    ///
    /// # Errors
    ///
    /// See [`CostAggregator::aggregate`].
    #[instrument(skip(self, window), fields(provider = self.api.name(), window = %window))]
    pub async fn aggregate_window(&self, window: TimeWindow) -> Result<CostTotals, CostQueryError> {
        let mut totals = CostTotals::new();

        if window.is_empty() {
            // Cost Explorer rejects Start == End; nothing has been billed yet.
            debug!("Empty window, skipping query");
            return Ok(totals);
        }

        let mut query = CostQuery {
            time_period: window,
            metrics: self.metrics.clone(),
            next_page_token: None,
        };
        let mut pages = 0_u32;

        loop {
            let page = self.api.get_cost_and_usage(&query).await?;
            pages += 1;
            accumulate(&mut totals, &page)?;

            match page.next_page_token {
                Some(token) => query.next_page_token = Some(token),
                None => break,
            }
        }

        info!(
            pages,
            accounts = totals.len(),
            total = totals.grand_total(),
            "Aggregated costs"
        );
        Ok(totals)
    }
}

/// Add every positive amortized amount on `page` to `totals`.
fn accumulate(totals: &mut CostTotals, page: &CostPage) -> Result<(), CostQueryError> {
    for bucket in &page.results_by_time {
        for group in &bucket.groups {
            let account_id = group.account_id()?;
            let amount = group.amount(CostAggregator::CONSUMED_METRIC)?;
            if !totals.add_positive(account_id, amount) {
                debug!(account_id, amount, "Skipping non-positive amount");
            }
        }
    }
    Ok(())
}
