//! Cloud API provider implementations.
//!
//! This module provides integrations with:
//!
//! - AWS Organizations - `ListAccounts`
//! - AWS Cost Explorer - `GetCostAndUsage`

pub mod aws;
mod traits;

pub use aws::{AwsCostExplorer, AwsOrganizations};
pub use traits::{
    Account, AccountPage, CostExplorerApi, CostGroup, CostMetric, CostPage, CostQuery,
    CostQueryError, CostRecord, DirectoryError, Granularity, MetricValue, OrganizationsApi,
    ResultByTime, TimeWindow,
};
