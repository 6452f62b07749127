use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::catalog::{FixtureCatalog, JsonCatalog};
use super::gdrive::GDriveConnector;
use super::jira::{JiraConnector, JiraCredentials};
use super::traits::{BacklogProvider, CatalogProvider, TicketProvider};
use super::types::ProviderMode;
use crate::app::{Config, ConnectorMode};
use crate::utils::EolError;

/// The three data sources the engine reads from
pub struct Connectors {
    pub catalog: Arc<dyn CatalogProvider>,
    pub tickets: Arc<dyn TicketProvider>,
    pub backlog: Arc<dyn BacklogProvider>,
}

impl Connectors {
    /// Build every connector from configuration
    ///
    /// `force_offline` overrides whatever mode the config asks for.
    pub fn from_config(config: &Config, force_offline: bool) -> Result<Self> {
        let timeout = Duration::from_secs(config.llm.timeout_secs);

        let catalog_mode = resolve_mode(
            "catalog",
            config.catalog.mode,
            force_offline,
            config.catalog.path.is_some(),
        )?;
        let catalog: Arc<dyn CatalogProvider> = match (catalog_mode, &config.catalog.path) {
            (ProviderMode::Live, Some(path)) => Arc::new(JsonCatalog::new(path.clone())),
            _ => Arc::new(FixtureCatalog),
        };

        let jira_credentials = jira_credentials(config);
        let jira_mode = resolve_mode(
            "jira",
            config.jira.mode,
            force_offline,
            jira_credentials.is_some(),
        )?;
        let tickets: Arc<dyn TicketProvider> = match (jira_mode, jira_credentials) {
            (ProviderMode::Live, Some(credentials)) => {
                Arc::new(JiraConnector::live(credentials, timeout)?)
            }
            _ => Arc::new(JiraConnector::offline()),
        };

        let drive_token = std::env::var(&config.gdrive.access_token_env)
            .ok()
            .filter(|token| !token.is_empty());
        let drive_mode = resolve_mode(
            "gdrive",
            config.gdrive.mode,
            force_offline,
            drive_token.is_some(),
        )?;
        let backlog: Arc<dyn BacklogProvider> = match (drive_mode, drive_token) {
            (ProviderMode::Live, Some(token)) => Arc::new(GDriveConnector::live(
                token,
                config.gdrive.folder.clone(),
                timeout,
            )?),
            _ => Arc::new(GDriveConnector::offline()),
        };

        Ok(Self {
            catalog,
            tickets,
            backlog,
        })
    }
}

fn jira_credentials(config: &Config) -> Option<JiraCredentials> {
    let token = std::env::var(&config.jira.token_env)
        .ok()
        .filter(|token| !token.is_empty())?;

    Some(JiraCredentials {
        server: config.jira.server.clone()?,
        email: config.jira.email.clone()?,
        token,
        project_key: config.jira.project_key.clone(),
    })
}

/// Decide whether a connector runs live or offline
pub fn resolve_mode(
    name: &str,
    configured: ConnectorMode,
    force_offline: bool,
    has_credentials: bool,
) -> Result<ProviderMode, EolError> {
    if force_offline {
        info!("{} connector forced offline", name);
        return Ok(ProviderMode::Offline);
    }

    match configured {
        ConnectorMode::Offline => {
            info!("{} connector configured offline", name);
            Ok(ProviderMode::Offline)
        }
        ConnectorMode::Live if has_credentials => Ok(ProviderMode::Live),
        ConnectorMode::Live => Err(EolError::ConfigError(format!(
            "{} connector is set to live but its credentials are not configured",
            name
        ))),
        ConnectorMode::Auto if has_credentials => Ok(ProviderMode::Live),
        ConnectorMode::Auto => {
            warn!("{} credentials not configured, serving offline fixtures", name);
            Ok(ProviderMode::Offline)
        }
    }
}
