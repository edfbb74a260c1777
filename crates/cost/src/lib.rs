#![allow(clippy::doc_markdown)] // Allow service names like CostExplorer without backticks

//! Account directory and cost aggregation for the AWS run-rate report.
//!
//! This crate talks to two AWS APIs through injectable provider traits:
//!
//! - **Organizations** - `ListAccounts` for the account-id to name directory
//! - **Cost Explorer** - `GetCostAndUsage` grouped by linked account
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Utc;
//! use run_rate_cost::{
//!     AwsCostExplorer, AwsOrganizations, CostAggregator, DirectoryFetcher, Granularity,
//! };
//!
//! let sdk_config = run_rate_cost::providers::aws::load_sdk_config(None).await;
//!
//! let directory = DirectoryFetcher::new(Arc::new(AwsOrganizations::new(&sdk_config)))
//!     .fetch()
//!     .await?;
//!
//! let aggregator = CostAggregator::new(Arc::new(AwsCostExplorer::new(&sdk_config)));
//! let monthly = aggregator.aggregate(Granularity::Monthly, Utc::now()).await?;
//!
//! for account in directory.iter() {
//!     println!("{}: {:.2}", account.name, monthly.get(&account.id));
//! }
//! ```
//!
//! ## Credentials
//!
//! Nothing here resolves credentials on its own. The AWS clients are built once
//! from the ambient credential chain (`aws_config::from_env()`) and handed to
//! the fetcher and aggregator, which only see the [`OrganizationsApi`] and
//! [`CostExplorerApi`] traits.

pub mod aggregate;
pub mod directory;
pub mod providers;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use aggregate::{CostAggregator, CostTotals};
pub use directory::{AccountDirectory, DirectoryFetcher, ListingMode, DEFAULT_PAGE_SIZE};
pub use providers::{
    Account, AccountPage, AwsCostExplorer, AwsOrganizations, CostExplorerApi, CostGroup,
    CostMetric, CostPage, CostQuery, CostQueryError, CostRecord, DirectoryError, Granularity,
    MetricValue, OrganizationsApi, ResultByTime, TimeWindow,
};
