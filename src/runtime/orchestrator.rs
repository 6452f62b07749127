use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, warn};

use crate::{
    app::{load_config_from, load_config_in, Config},
    cli::{handle_command, Cli},
    connectors::Connectors,
    constants::EXIT_COMMANDS,
    engine::QaEngine,
    models::{ModelFactory, TextGenerator},
    utils::EolError,
};

use super::non_interactive::{format_result, NonInteractiveRunner};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        Self::new_in(cli, Path::new("."))
    }

    /// Like `new`, discovering the project config under `project_dir`
    pub fn new_in(cli: Cli, project_dir: &Path) -> Result<Self> {
        let loaded = match &cli.config {
            Some(config_path) => load_config_from(config_path),
            None => load_config_in(project_dir),
        };
        let mut config = loaded.map_err(|e| EolError::ConfigError(format!("{:#}", e)))?;

        // CLI model overrides config
        if let Some(model) = &cli.model {
            config.llm.model = model.clone();
        }

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator; returns whether the run succeeded
    pub async fn run(self) -> Result<bool> {
        if let Some(command) = &self.cli.command {
            handle_command(command, &self.config, self.cli.offline).await?;
            return Ok(true);
        }

        let engine = self.build_engine().await?;

        if let Some(prompt) = self.cli.prompt.clone() {
            let runner = NonInteractiveRunner::new(engine);
            let result = runner.execute(prompt).await;
            println!("{}", format_result(&result, self.cli.output_format));
            return Ok(result.errors.is_empty());
        }

        run_interactive(&engine).await?;
        Ok(true)
    }

    /// Wire connectors and model into an engine
    pub async fn build_engine(&self) -> Result<QaEngine> {
        let connectors = Connectors::from_config(&self.config, self.cli.offline)?;

        let generator: Arc<dyn TextGenerator> =
            Arc::from(ModelFactory::create(&self.config.llm.model, &self.config.llm)?);

        let engine = QaEngine::new(
            connectors.catalog.as_ref(),
            connectors.tickets,
            connectors.backlog,
            generator,
        )
        .await?;

        Ok(engine)
    }
}

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// One of the exit commands was typed
    Exit,
    EndOfInput,
    /// `shutdown` resolved, possibly while an answer was pending
    Interrupted,
}

/// Interactive loop on stdin; Ctrl-C leaves it, even mid-answer
async fn run_interactive(engine: &QaEngine) -> Result<()> {
    println!("{}", "=== Python EOL & Deprecation Assistant ===".bold());
    println!(
        "Model: {} | {} deprecations loaded",
        engine.model_name().green(),
        engine.catalog().len()
    );
    println!("Type '{}' to leave.", EXIT_COMMANDS.join("', '"));

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let end = run_session(engine, BufReader::new(tokio::io::stdin()), ctrl_c).await?;
    if end != SessionEnd::Exit {
        println!();
    }
    println!("Goodbye!");
    Ok(())
}

/// Answer one question per input line until exit, end of input or `shutdown`
///
/// `shutdown` is polled for the whole session, so a pending answer is dropped
/// as soon as it resolves.
pub async fn run_session<R, F>(engine: &QaEngine, input: R, shutdown: F) -> Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        print!("\n{} ", "Your question:".cyan().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => return Ok(SessionEnd::Interrupted),
        };
        let Some(line) = line else {
            return Ok(SessionEnd::EndOfInput);
        };

        let question = line.trim();
        if EXIT_COMMANDS.contains(&question.to_lowercase().as_str()) {
            return Ok(SessionEnd::Exit);
        }
        if question.is_empty() {
            continue;
        }

        tokio::select! {
            result = engine.answer(question) => match result {
                Ok(answer) => println!("\n{} {}", "Assistant:".green().bold(), answer),
                Err(e) => {
                    error!("Failed to answer: {}", e);
                    eprintln!("\n{} {}", "Error:".red().bold(), e);
                }
            },
            _ = &mut shutdown => {
                warn!("Interrupted while answering '{}'", question);
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}
