//! AWS SDK backed providers.

use async_trait::async_trait;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity as ApiGranularity, GroupDefinition, GroupDefinitionType,
};
use aws_sdk_organizations::operation::list_accounts::ListAccountsOutput;
use tracing::{debug, instrument, warn};

use crate::providers::{
    Account, AccountPage, CostExplorerApi, CostGroup, CostPage, CostQuery, CostQueryError,
    DirectoryError, MetricValue, OrganizationsApi, ResultByTime,
};

/// Cost Explorer dimension for member-account grouping.
const LINKED_ACCOUNT_DIMENSION: &str = "LINKED_ACCOUNT";

/// Load the shared SDK configuration from the ambient credential chain.
pub async fn load_sdk_config(region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::from_env();

    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }

    loader.load().await
}

/// AWS Organizations `ListAccounts` provider.
#[derive(Debug, Clone)]
pub struct AwsOrganizations {
    client: aws_sdk_organizations::Client,
}

impl AwsOrganizations {
    /// Create a provider from a loaded SDK configuration.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_organizations::Client::new(sdk_config),
        }
    }

    /// Convert a `ListAccounts` response into our common format.
    fn convert_page(output: &ListAccountsOutput) -> AccountPage {
        let accounts = output
            .accounts()
            .iter()
            .filter_map(|account| {
                let Some(id) = account.id() else {
                    warn!("Skipping account without an id");
                    return None;
                };
                let name = account.name().unwrap_or(id);
                Some(Account::new(id, name))
            })
            .collect();

        AccountPage {
            accounts,
            next_token: output.next_token().map(ToString::to_string),
        }
    }
}

#[async_trait]
impl OrganizationsApi for AwsOrganizations {
    fn name(&self) -> &'static str {
        "aws-organizations"
    }

    #[instrument(skip(self, next_token), fields(provider = "aws-organizations"))]
    async fn list_accounts(
        &self,
        max_results: i32,
        next_token: Option<String>,
    ) -> Result<AccountPage, DirectoryError> {
        debug!(has_token = next_token.is_some(), "Calling ListAccounts");

        let output = self
            .client
            .list_accounts()
            .max_results(max_results)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                DirectoryError::Api(
                    aws_sdk_organizations::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(Self::convert_page(&output))
    }
}

/// AWS Cost Explorer `GetCostAndUsage` provider.
#[derive(Debug, Clone)]
pub struct AwsCostExplorer {
    client: aws_sdk_costexplorer::Client,
}

impl AwsCostExplorer {
    /// Create a provider from a loaded SDK configuration.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_costexplorer::Client::new(sdk_config),
        }
    }

    /// Convert a `GetCostAndUsage` response into the typed page schema.
    fn convert_page(output: &GetCostAndUsageOutput) -> CostPage {
        let results_by_time = output
            .results_by_time()
            .iter()
            .map(|result| ResultByTime {
                groups: result
                    .groups()
                    .iter()
                    .map(|group| CostGroup {
                        keys: group.keys().to_vec(),
                        metrics: group
                            .metrics()
                            .map(|metrics| {
                                metrics
                                    .iter()
                                    .map(|(name, value)| {
                                        (
                                            name.clone(),
                                            MetricValue {
                                                amount: value.amount().map(ToString::to_string),
                                                unit: value.unit().map(ToString::to_string),
                                            },
                                        )
                                    })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        CostPage {
            results_by_time,
            next_page_token: output.next_page_token().map(ToString::to_string),
        }
    }
}

#[async_trait]
impl CostExplorerApi for AwsCostExplorer {
    fn name(&self) -> &'static str {
        "aws-cost-explorer"
    }

    #[instrument(skip(self, query), fields(provider = "aws-cost-explorer", window = %query.time_period))]
    async fn get_cost_and_usage(&self, query: &CostQuery) -> Result<CostPage, CostQueryError> {
        let time_period = DateInterval::builder()
            .start(query.time_period.start_date())
            .end(query.time_period.end_date())
            .build()
            .map_err(|e| CostQueryError::InvalidTimeRange(e.to_string()))?;

        let group_by = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key(LINKED_ACCOUNT_DIMENSION)
            .build();

        let mut request = self
            .client
            .get_cost_and_usage()
            .time_period(time_period)
            .granularity(ApiGranularity::Daily)
            .group_by(group_by)
            .set_next_page_token(query.next_page_token.clone());

        for metric in &query.metrics {
            request = request.metrics(metric.as_str());
        }

        debug!(
            metrics = query.metrics.len(),
            has_token = query.next_page_token.is_some(),
            "Calling GetCostAndUsage"
        );

        let output = request
            .send()
            .await
            .map_err(|e| CostQueryError::Api(DisplayErrorContext(&e).to_string()))?;

        Ok(Self::convert_page(&output))
    }
}
