use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pyeol")]
#[command(version)]
#[command(about = "Answers questions about Python deprecations, Jira tickets and the backlog", long_about = None)]
pub struct Cli {
    /// Model to use (e.g., ollama/gemma3:1b, gemini/gemini-2.5-flash, mock/offline)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Serve every connector from built-in fixtures
    #[arg(long)]
    pub offline: bool,

    /// Answer a single question and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Show connector modes and the configured model
    Status,
    /// Browse the deprecation catalog
    Catalog {
        /// Only entries pending removal in this Python version (e.g. 3.15)
        #[arg(long, conflicts_with = "search")]
        removal: Option<String>,
        /// Keyword search over feature names and descriptions
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a Jira ticket in the configured project
    CreateTicket {
        summary: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
