mod commands;
mod logging;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use logging::{LogConfig, LogLevel};
use stackflow_compose::RunMode;
use stackflow_core::ComposeConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "stackflow")]
#[command(about = "Ordered, concurrent CloudFormation deployments from one compose file", long_about = None)]
struct Cli {
    /// Compose file (otherwise STACKFLOW_CONFIG, then ./stackflow.yml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level; RUST_LOG overrides it
    #[arg(long, global = true, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Preview changes without applying them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Run only this flow
    #[arg(short, long)]
    pub flow: Option<String>,

    /// Worker count; 0 or less means one per flow
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub workers: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update every stack, order levels ascending
    Deploy(RunArgs),
    /// Delete every stack, order levels descending
    Destroy(RunArgs),
    /// Inspect or bootstrap the compose file
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Load and validate the compose file
    Validate,
    /// Show order levels with their flows and stacks
    Visualize,
    /// Print a sample compose file
    Generate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&LogConfig::new(cli.log_level))?;

    let result = match cli.command {
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Config(ConfigCommands::Generate) => commands::config::generate(),
        Commands::Config(ConfigCommands::Validate) => {
            let (_, config) = load_or_exit(cli.config.as_deref());
            commands::config::validate(&config)
        }
        Commands::Config(ConfigCommands::Visualize) => {
            let (_, config) = load_or_exit(cli.config.as_deref());
            commands::config::visualize(&config)
        }
        Commands::Deploy(args) => {
            let (path, config) = load_or_exit(cli.config.as_deref());
            commands::run::handle(&path, &config, RunMode::Deploy, &args, !cli.no_progress).await
        }
        Commands::Destroy(args) => {
            let (path, config) = load_or_exit(cli.config.as_deref());
            commands::run::handle(&path, &config, RunMode::Destroy, &args, !cli.no_progress).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// Locate and load the compose file, or report and exit
fn load_or_exit(explicit: Option<&Path>) -> (PathBuf, ComposeConfig) {
    let loaded = stackflow_config::find_compose_file(explicit)
        .map_err(anyhow::Error::from)
        .and_then(|path| commands::load(&path).map(|config| (path, config)));

    match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
