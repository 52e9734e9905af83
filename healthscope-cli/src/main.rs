//! CLI entrypoint for Healthscope
//!
//! Wires configuration, the credential store and the completion pipeline
//! together, then dispatches the subcommand.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level. Logs go to stderr so
    // stdout carries only the transcript.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting healthscope {}", healthscope_core::version());

    let context = commands::Context::load(cli.config.as_deref(), cli.no_stream)?;

    match cli.command {
        Command::Key { action } => commands::key(&context, action),
        Command::Assess(args) => commands::assess(&context, args).await,
        Command::Plan(args) => commands::plan(&context, args).await,
    }
}
