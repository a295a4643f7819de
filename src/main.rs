use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands};
use wsroots::workspace::VcsDetector;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let detector = VcsDetector::new(Duration::from_millis(cli.vcs_timeout_ms.max(1)));

    let Some(cmd) = &cli.command else {
        // No command specified, show help
        eprintln!("No command specified. Use --help for usage information.");
        eprintln!("Use 'wsroots summary' to inspect the current workspace.");
        return Ok(());
    };

    match cmd {
        Commands::Summary { status } => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_summary(&manager, &detector, *status).await?;
        }
        Commands::Context => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_context(&manager)?;
        }
        Commands::Resolve { path, disambiguate } => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_resolve(&manager, path, *disambiguate)?;
        }
        Commands::Which { path } => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_which(&manager, path)?;
        }
        Commands::Find { path } => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_find(&manager, path)?;
        }
        Commands::Switch { identifier } => {
            let (manager, home) = cli::load_manager(&cli, &detector).await?;
            let persist = cli.workspaces.is_empty();
            command::run_switch(manager, &home, identifier, persist)?;
        }
        Commands::State => {
            let (manager, _) = cli::load_manager(&cli, &detector).await?;
            command::run_state(&manager)?;
        }
        Commands::Refresh => {
            let (manager, home) = cli::load_manager(&cli, &detector).await?;
            let persist = cli.workspaces.is_empty();
            command::run_refresh(manager, &home, &detector, persist).await?;
        }
        Commands::Detect {
            dir,
            max_depth,
            include_hidden,
        } => {
            let dir = cli::resolve_dir(dir.as_deref())?;
            command::run_detect(&dir, &detector, *max_depth, *include_hidden).await?;
        }
        Commands::Init { dir, force } => {
            let dir = cli::resolve_dir(dir.as_deref())?;
            command::run_init(&dir, &detector, *force).await?;
        }
        Commands::Validate { dir } => {
            let dir = cli::resolve_dir(dir.as_deref())?;
            command::run_validate(&dir)?;
        }
    }

    Ok(())
}
