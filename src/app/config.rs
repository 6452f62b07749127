use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_GDRIVE_FOLDER, DEFAULT_GDRIVE_TOKEN_ENV, DEFAULT_GEMINI_API_KEY_ENV,
    DEFAULT_JIRA_PROJECT_KEY, DEFAULT_JIRA_TOKEN_ENV, DEFAULT_MODEL_ID, DEFAULT_OLLAMA_URL,
    HTTP_REQUEST_TIMEOUT_SECS,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Text generation backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Deprecation catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Jira connection
    #[serde(default)]
    pub jira: JiraConfig,

    /// Google Drive backlog
    #[serde(default)]
    pub gdrive: GDriveConfig,
}

/// How a connector decides between its live backend and fixture data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorMode {
    /// Live when a credential is configured, offline otherwise (logged)
    #[default]
    Auto,
    /// Always live; a missing credential is a configuration error
    Live,
    /// Always fixture data
    Offline,
}

/// Text generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier in `provider/model` form
    pub model: String,
    /// Ollama server URL
    pub ollama_url: String,
    /// Environment variable holding the Gemini API key
    pub gemini_api_key_env: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Sampling temperature, backend default when unset
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_ID.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            gemini_api_key_env: DEFAULT_GEMINI_API_KEY_ENV.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            temperature: None,
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON export of deprecation records
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub mode: ConnectorMode,
}

/// Jira settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Base URL, e.g. https://example.atlassian.net
    pub server: Option<String>,
    /// Account email used for basic auth
    pub email: Option<String>,
    /// Environment variable holding the API token
    pub token_env: String,
    pub project_key: String,
    #[serde(default)]
    pub mode: ConnectorMode,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            server: None,
            email: None,
            token_env: DEFAULT_JIRA_TOKEN_ENV.to_string(),
            project_key: DEFAULT_JIRA_PROJECT_KEY.to_string(),
            mode: ConnectorMode::Auto,
        }
    }
}

/// Google Drive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GDriveConfig {
    /// Environment variable holding an OAuth access token
    pub access_token_env: String,
    /// Name of the folder that holds backlog notes
    pub folder: String,
    #[serde(default)]
    pub mode: ConnectorMode,
}

impl Default for GDriveConfig {
    fn default() -> Self {
        Self {
            access_token_env: DEFAULT_GDRIVE_TOKEN_ENV.to_string(),
            folder: DEFAULT_GDRIVE_FOLDER.to_string(),
            mode: ConnectorMode::Auto,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    load_config_in(Path::new("."))
}

/// Like `load_config`, with the project-local layer read from `project_dir`
///
/// Missing files are skipped; a file that fails to parse is an error.
pub fn load_config_in(project_dir: &Path) -> Result<Config> {
    // Get config directories
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = project_dir.join(".pyeol").join("config.toml");

    // Build figment configuration
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    // Add global config if it exists
    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    // Add local config if it exists
    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    extract_with_env(figment)
}

/// Load configuration from one explicit file, still honouring environment overrides
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path));

    extract_with_env(figment)
}

fn extract_with_env(figment: Figment) -> Result<Config> {
    // PYEOL_JIRA__SERVER -> jira.server
    figment
        .merge(Env::prefixed("PYEOL_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pyeol") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("pyeol");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        let default_config = Config::default();
        save_config(&default_config, Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    // Create example local config
    let local_example = PathBuf::from(".pyeol/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# pyeol project configuration
# This file overrides global settings for this project

[llm]
model = "ollama/gemma3:1b"
ollama_url = "http://localhost:11434"
timeout_secs = 180

[catalog]
# JSON export of the docs.python.org deprecation list
# path = "deprecations.json"
mode = "auto"

[jira]
server = "https://your-team.atlassian.net"
email = "you@example.com"
token_env = "JIRA_TOKEN"
project_key = "SCRUM"
mode = "auto"

[gdrive]
access_token_env = "GDRIVE_ACCESS_TOKEN"
folder = "Deprecation Notes"
mode = "auto"
"#;
        std::fs::write(&local_example, example_config)?;
        println!("Created example configuration at: {}", local_example.display());
    }

    Ok(())
}
