//! envinline CLI - build-time environment variable inlining for function sources.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            cli::run_command(args, cli.verbose).await?;
        }
        Commands::Discover(args) => {
            cli::discover_command(args, cli.verbose).await?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config().await?;
        }
        Commands::ListLanguages => {
            cli::list_languages().await?;
        }
    }

    Ok(())
}
