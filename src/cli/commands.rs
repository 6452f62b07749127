use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    connectors::{BacklogProvider, CatalogProvider, Connectors, DeprecationRecord, TicketProvider},
    engine::match_deprecations,
};

use super::Commands;

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, config: &Config, offline: bool) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Initializing pyeol configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
        }
        Commands::Status => show_status(config, offline)?,
        Commands::Catalog { removal, search } => {
            show_catalog(config, offline, removal.as_deref(), search.as_deref()).await?
        }
        Commands::CreateTicket {
            summary,
            description,
        } => create_ticket(config, offline, summary, description).await?,
        Commands::Version => show_version(),
    }
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("pyeol v{}", env!("CARGO_PKG_VERSION"));
    println!("   Python deprecation, Jira and backlog assistant");
}

fn show_status(config: &Config, offline: bool) -> Result<()> {
    println!("pyeol Status:");
    println!();
    println!("  Model: {}", config.llm.model.green());

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    match Connectors::from_config(config, offline) {
        Ok(connectors) => {
            println!("  Catalog: {}", connectors.catalog.mode());
            println!("  Jira: {}", connectors.tickets.mode());
            println!("  Google Drive: {}", connectors.backlog.mode());
        }
        Err(e) => println!("  [ERROR] Connectors: {:#}", e),
    }

    println!("\n  Environment:");
    for var in [
        config.jira.token_env.as_str(),
        config.gdrive.access_token_env.as_str(),
        config.llm.gemini_api_key_env.as_str(),
    ] {
        let state = if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
            "Set"
        } else {
            "Not set"
        };
        println!("    • {}: {}", var, state);
    }

    println!();
    Ok(())
}

async fn show_catalog(
    config: &Config,
    offline: bool,
    removal: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let connectors = Connectors::from_config(config, offline)?;
    let catalog = connectors.catalog.load().await?;

    let selected = select_records(&catalog, removal, search);

    if selected.is_empty() {
        println!("No matching deprecations.");
        return Ok(());
    }

    println!("{} deprecations ({}):", selected.len(), connectors.catalog.mode());
    for record in selected {
        println!(
            "  • {} (Deprecated: {}, Removed: {})",
            record.feature.green(),
            record.version_deprecated,
            record.version_removed.as_deref().unwrap_or("N/A")
        );
    }
    Ok(())
}

/// `--removal` compares `version_removed` verbatim (case-insensitive), so
/// non-numeric values such as "Future" work too
fn select_records<'a>(
    catalog: &'a [DeprecationRecord],
    removal: Option<&str>,
    search: Option<&str>,
) -> Vec<&'a DeprecationRecord> {
    match (removal, search) {
        (Some(version), _) => catalog
            .iter()
            .filter(|d| {
                d.version_removed
                    .as_deref()
                    .is_some_and(|v| v.eq_ignore_ascii_case(version.trim()))
            })
            .collect(),
        (None, Some(query)) => match_deprecations(query, catalog).hits,
        (None, None) => catalog.iter().collect(),
    }
}

async fn create_ticket(config: &Config, offline: bool, summary: &str, description: &str) -> Result<()> {
    let connectors = Connectors::from_config(config, offline)?;
    let key = connectors.tickets.create(summary, description).await?;
    println!("Created {} ({})", key.green(), connectors.tickets.mode());
    Ok(())
}
