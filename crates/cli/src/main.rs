//! instapost CLI entry point

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config errors surface from the commands that need it
    let loaded = AppConfig::load(cli.config.as_deref());

    // Initialize logging
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_logging(&log_level)?;

    // Execute command
    match cli.command {
        Commands::Ayrshare(args) => commands::post::ayrshare(args, &loaded?).await,
        Commands::Buffer(args) => commands::post::buffer(args, &loaded?).await,
        Commands::Graph(args) => commands::post::graph(args, &loaded?).await,
        Commands::Late(args) => commands::post::late(args, &loaded?).await,
        Commands::Zapier(args) => commands::post::zapier(args, &loaded?).await,
        Commands::Config(args) => {
            commands::config::execute(args, cli.config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
