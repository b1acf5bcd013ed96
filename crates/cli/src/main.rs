mod cli;
mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    hunt_core::config::load_dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    match args.command {
        Command::Run(args) => commands::run(args).await,
        Command::Render(args) => commands::render(args),
        Command::Check(args) => commands::check(args).await,
        Command::Validate(args) => commands::validate(args),
    }
}
