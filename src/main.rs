use clap::Parser;
use tracing_subscriber::EnvFilter;

use zoo_schedule::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            zoo_schedule::cli::serve::execute(host, port).await?;
        }
        Commands::Config => {
            zoo_schedule::cli::config::execute()?;
        }
    }

    Ok(())
}
