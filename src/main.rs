use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use goldrate::cli::setup::setup;
use goldrate::core::log::init_logging;
use goldrate::{AppCommand, run_command};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create example configuration
    Setup,
    /// Fetch rates from the configured providers and store them
    Refresh,
    /// Show the stored metal rates
    Rates,
    /// Show price breakdowns for configured products
    Price,
    /// Show progress of configured chit plans
    Chit,
}

impl Commands {
    /// Commands that run against a loaded configuration.
    fn app_command(&self) -> Option<AppCommand> {
        match self {
            Commands::Setup => None,
            Commands::Refresh => Some(AppCommand::Refresh),
            Commands::Rates => Some(AppCommand::Rates),
            Commands::Price => Some(AppCommand::Price),
            Commands::Chit => Some(AppCommand::Chit),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.as_ref().map(Commands::app_command) {
        Some(Some(command)) => run_command(command, cli.config_path.as_deref()).await,
        Some(None) => setup(),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
