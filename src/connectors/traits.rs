use anyhow::Result;
use async_trait::async_trait;

use super::types::{BacklogItem, DeprecationRecord, ProviderMode, Ticket};

/// Source of the deprecation catalog, read once per engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn load(&self) -> Result<Vec<DeprecationRecord>>;

    fn mode(&self) -> ProviderMode;
}

/// Ticket tracker access
#[async_trait]
pub trait TicketProvider: Send + Sync {
    /// List tickets of the project, optionally restricted to one status
    async fn list(&self, status: Option<&str>) -> Result<Vec<Ticket>>;

    /// Fetch one ticket; `Ok(None)` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<Ticket>>;

    /// Create a ticket and return its key
    async fn create(&self, summary: &str, description: &str) -> Result<String>;

    fn mode(&self) -> ProviderMode;
}

/// Backlog notes access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BacklogProvider: Send + Sync {
    async fn list(&self) -> Result<Vec<BacklogItem>>;

    fn mode(&self) -> ProviderMode;
}
