use anyhow::Result;
use clap::Parser;

use pyeol::{cli::Cli, runtime::Orchestrator, utils::init_logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let orchestrator = Orchestrator::new(cli)?;
    let succeeded = orchestrator.run().await?;

    // Exit with appropriate code
    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
