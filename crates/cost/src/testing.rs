//! In-memory provider fakes for tests.
//!
//! Enabled inside this crate's unit tests and for dependents through the
//! `test-util` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::providers::{
    Account, AccountPage, CostExplorerApi, CostGroup, CostMetric, CostPage, CostQuery,
    CostQueryError, DirectoryError, MetricValue, OrganizationsApi, ResultByTime,
};

/// Serves a fixed sequence of account pages, chained by `page-N` tokens.
pub struct FakeOrganizations {
    pages: Vec<Vec<Account>>,
    failure: Option<String>,
    page_sizes: Mutex<Vec<i32>>,
}

impl FakeOrganizations {
    /// Serve `pages` in order.
    #[must_use]
    pub fn new(pages: Vec<Vec<Account>>) -> Self {
        Self {
            pages,
            failure: None,
            page_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(message.into()),
            page_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Number of `list_accounts` calls made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.page_sizes.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Page sizes requested, one per call.
    #[must_use]
    pub fn page_sizes(&self) -> Vec<i32> {
        self.page_sizes.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OrganizationsApi for FakeOrganizations {
    fn name(&self) -> &'static str {
        "fake-organizations"
    }

    async fn list_accounts(
        &self,
        max_results: i32,
        next_token: Option<String>,
    ) -> Result<AccountPage, DirectoryError> {
        if let Ok(mut sizes) = self.page_sizes.lock() {
            sizes.push(max_results);
        }
        if let Some(message) = &self.failure {
            return Err(DirectoryError::Api(message.clone()));
        }

        let index = page_index(next_token.as_deref())
            .map_err(|token| DirectoryError::Api(format!("unknown NextToken {token}")))?;
        let accounts = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(AccountPage {
            accounts,
            next_token,
        })
    }
}

/// Serves a fixed sequence of cost pages, chained by `page-N` tokens.
///
/// Any `NextPageToken` already present on a supplied page is replaced.
pub struct FakeCostExplorer {
    pages: Vec<CostPage>,
    failure: Option<String>,
    queries: Mutex<Vec<CostQuery>>,
}

impl FakeCostExplorer {
    /// Serve `pages` in order.
    #[must_use]
    pub fn new(pages: Vec<CostPage>) -> Self {
        Self {
            pages,
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(message.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received, one per call.
    #[must_use]
    pub fn queries(&self) -> Vec<CostQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CostExplorerApi for FakeCostExplorer {
    fn name(&self) -> &'static str {
        "fake-cost-explorer"
    }

    async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<CostPage, CostQueryError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        if let Some(message) = &self.failure {
            return Err(CostQueryError::Api(message.clone()));
        }

        let index = page_index(query.next_page_token.as_deref())
            .map_err(|token| CostQueryError::Api(format!("unknown NextPageToken {token}")))?;
        let mut page = self.pages.get(index).cloned().unwrap_or_default();
        page.next_page_token =
            (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(page)
    }
}

fn page_index(token: Option<&str>) -> Result<usize, String> {
    match token {
        None => Ok(0),
        Some(token) => token
            .strip_prefix("page-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| token.to_string()),
    }
}

/// Build a cost page with one time bucket per entry of `buckets`, each holding
/// `(account_id, AmortizedCost amount)` groups.
#[must_use]
pub fn cost_page(buckets: &[&[(&str, &str)]]) -> CostPage {
    CostPage {
        results_by_time: buckets
            .iter()
            .map(|groups| ResultByTime {
                groups: groups
                    .iter()
                    .map(|(account_id, amount)| amortized_group(account_id, amount))
                    .collect(),
            })
            .collect(),
        next_page_token: None,
    }
}

/// A group carrying only the `AmortizedCost` metric.
#[must_use]
pub fn amortized_group(account_id: &str, amount: &str) -> CostGroup {
    let mut metrics = HashMap::new();
    metrics.insert(
        CostMetric::AmortizedCost.as_str().to_string(),
        MetricValue {
            amount: Some(amount.to_string()),
            unit: Some("USD".to_string()),
        },
    );
    CostGroup {
        keys: vec![account_id.to_string()],
        metrics,
    }
}
