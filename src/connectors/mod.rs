// Gateway module for connectors - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod catalog;
mod factory;
mod fixtures;
mod gdrive;
mod jira;
mod traits;
mod types;

// Public re-exports - the ONLY way to access connector functionality
pub use catalog::{FixtureCatalog, JsonCatalog};
pub use factory::{resolve_mode, Connectors};
pub use gdrive::GDriveConnector;
pub use jira::{JiraConnector, JiraCredentials};
pub use traits::{BacklogProvider, CatalogProvider, TicketProvider};
pub use types::{BacklogItem, DeprecationRecord, ProviderMode, Ticket};

#[cfg(test)]
pub use traits::{MockBacklogProvider, MockCatalogProvider};
