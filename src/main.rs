//! Filemon - report who changed a watched file and what changed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use filemon::config::ConfigLoader;
use filemon::display;
use filemon::monitor::{supervise, MonitorError};

#[derive(Parser)]
#[command(
    name = "filemon",
    about = "Watch files and report who changed what, line by line",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file (default: ./filemon.toml, then the
    /// user config directory).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the configured files (default).
    Watch,
    /// Add a file to the configuration.
    Add {
        /// File to monitor.
        file: PathBuf,
    },
    /// Remove a file from the configuration.
    Remove {
        /// File to stop monitoring.
        file: PathBuf,
    },
    /// List the configured files.
    List,
    /// Check that the configuration file is well formed.
    Validate,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn watch(loader: &ConfigLoader) -> Result<(), MonitorError> {
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            ctrl_c.cancel();
        }
    });

    supervise(loader, shutdown).await
}

async fn run(cli: Cli) -> Result<(), MonitorError> {
    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&loader).await?,
        Commands::Add { file } => {
            let (config_path, _) = loader.load_or_create()?;
            let stored = ConfigLoader::add_file(&config_path, &file)?;
            display::print_updated("ADDED", &stored);
        }
        Commands::Remove { file } => {
            let (config_path, _) = loader.load_or_create()?;
            ConfigLoader::remove_file(&config_path, &file)?;
            display::print_updated("REMOVED", &file);
        }
        Commands::List => {
            let (config_path, config) = loader.load_or_create()?;
            display::print_file_list(&config_path, &config);
        }
        Commands::Validate => {
            let config_path = loader.resolve();
            let config = ConfigLoader::load(&config_path)?;
            display::print_valid(&config_path, &config);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "filemon failed");
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
