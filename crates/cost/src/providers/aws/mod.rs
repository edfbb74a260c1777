//! AWS Organizations and Cost Explorer clients.
//!
//! Both clients are built from one [`aws_config::SdkConfig`] resolved from the
//! standard credential chain (environment, shared profile, instance or task
//! role).
//!
//! ## Example
//!
//! ```rust,ignore
//! use run_rate_cost::providers::aws::{load_sdk_config, AwsCostExplorer, AwsOrganizations};
//!
//! let sdk_config = load_sdk_config(Some("us-east-1".to_string())).await;
//! let organizations = AwsOrganizations::new(&sdk_config);
//! let cost_explorer = AwsCostExplorer::new(&sdk_config);
//! ```

mod client;

pub use client::{load_sdk_config, AwsCostExplorer, AwsOrganizations};
