pub mod config;
pub mod serve;

use clap::{Parser, Subcommand};

/// Zoo Schedule - calendar events with live change notifications
#[derive(Debug, Parser)]
#[command(name = "zoo-schedule", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration
    Config,
}
