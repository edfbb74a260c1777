//! Organization account directory.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::providers::{Account, DirectoryError, OrganizationsApi};

/// Largest page size `ListAccounts` accepts.
pub const DEFAULT_PAGE_SIZE: i32 = 20;

/// How far to follow `ListAccounts` pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingMode {
    /// Stop after the first page (at most `page_size` accounts).
    FirstPage,
    /// Follow `NextToken` until the listing is exhausted.
    #[default]
    AllPages,
}

/// Ordered account-id to display-name mapping.
///
/// Order is the order the organization API returned the accounts in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    /// Create a directory from accounts in listing order.
    #[must_use]
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the directory has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over accounts in listing order.
    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }

    /// Look up an account's display name.
    #[must_use]
    pub fn name(&self, account_id: &str) -> Option<&str> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.name.as_str())
    }

    /// Whether the directory contains `account_id`.
    #[must_use]
    pub fn contains(&self, account_id: &str) -> bool {
        self.name(account_id).is_some()
    }
}

impl FromIterator<Account> for AccountDirectory {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AccountDirectory {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fetches the organization's account directory.
pub struct DirectoryFetcher {
    api: Arc<dyn OrganizationsApi>,
    page_size: i32,
    mode: ListingMode,
}

impl DirectoryFetcher {
    /// Create a fetcher that follows all pages of 20 accounts.
    #[must_use]
    pub fn new(api: Arc<dyn OrganizationsApi>) -> Self {
        Self {
            api,
            page_size: DEFAULT_PAGE_SIZE,
            mode: ListingMode::default(),
        }
    }

    /// Set the `ListAccounts` page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the pagination mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ListingMode) -> Self {
        self.mode = mode;
        self
    }

    /// List the organization's accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the page size is out of range or any
    /// `ListAccounts` call fails. Nothing is retried.
    #[instrument(skip(self), fields(provider = self.api.name(), mode = ?self.mode))]
    pub async fn fetch(&self) -> Result<AccountDirectory, DirectoryError> {
        if !(1..=DEFAULT_PAGE_SIZE).contains(&self.page_size) {
            return Err(DirectoryError::Config(format!(
                "page size must be between 1 and {DEFAULT_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }

        let mut accounts = Vec::new();
        let mut next_token = None;
        let mut pages = 0_u32;

        loop {
            let page = self.api.list_accounts(self.page_size, next_token).await?;
            pages += 1;
            debug!(page = pages, accounts = page.accounts.len(), "Fetched account page");
            accounts.extend(page.accounts);

            next_token = match (self.mode, page.next_token) {
                (ListingMode::AllPages, Some(token)) => Some(token),
                (ListingMode::FirstPage, Some(_)) => {
                    info!(
                        fetched = accounts.len(),
                        "More accounts available; listing limited to the first page"
                    );
                    break;
                }
                (_, None) => break,
            };
        }

        info!(accounts = accounts.len(), pages, "Fetched account directory");
        Ok(AccountDirectory::new(accounts))
    }
}
