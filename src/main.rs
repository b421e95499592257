use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledger_export::cli::{handle_config_command, handle_run_command, ConfigCommands, RunArgs};
use ledger_export::config::{ExportPaths, Settings};
use ledger_export::ExportEngine;

#[derive(Parser)]
#[command(
    name = "ledger-export",
    author = "Kaylee Beyene",
    version,
    about = "Configurable reporting and export engine for personal finance",
    long_about = "ledger-export keeps named export configurations and turns \
                  personal-finance records into spreadsheet, CSV, JSON or XML \
                  reports from the command line."
)]
struct Cli {
    /// Log pipeline details (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export configuration management commands
    #[command(subcommand, alias = "cfg")]
    Config(ConfigCommands),

    /// Run an export over a JSON file of records
    Run(RunArgs),

    /// Show data and export paths
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = ExportPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings, cli.verbose);

    match cli.command {
        Some(Commands::Config(cmd)) => {
            let engine = ExportEngine::open_at(&paths)?;
            handle_config_command(&engine, cmd)?;
            engine.shutdown()?;
        }
        Some(Commands::Run(args)) => {
            let engine = ExportEngine::open_at(&paths)?;
            handle_run_command(&engine, &paths, args)?;
            engine.shutdown()?;
        }
        Some(Commands::Paths) => {
            println!("ledger-export Paths");
            println!("===================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Exports directory: {}", settings.output_dir(&paths).display());
            println!("Settings file:     {}", paths.settings_file().display());
        }
        None => {
            println!("ledger-export - Reporting and export engine for personal finance");
            println!();
            println!("Run 'ledger-export --help' for usage information.");
            println!("Run 'ledger-export config list' to see export configurations.");
        }
    }

    Ok(())
}

fn init_logging(settings: &Settings, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
