//! CLI commands for export configuration management

use clap::{Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::display::{format_config_details, format_config_list};
use crate::engine::ExportEngine;
use crate::error::{LedgerError, LedgerResult};
use crate::export::BundleFormat;
use crate::models::{ConfigPatch, NewExportConfig};

use super::resolve_config;

/// Bundle format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BundleFormatArg {
    /// JSON bundle
    Json,
    /// YAML bundle (human-readable)
    Yaml,
}

impl From<BundleFormatArg> for BundleFormat {
    fn from(arg: BundleFormatArg) -> Self {
        match arg {
            BundleFormatArg::Json => BundleFormat::Json,
            BundleFormatArg::Yaml => BundleFormat::Yaml,
        }
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// List export configurations
    List {
        /// Only show active configurations
        #[arg(long)]
        active: bool,
    },

    /// Show a configuration's columns, filters and schedule
    Show {
        /// Configuration name or ID
        config: String,
    },

    /// Create a configuration from a JSON or YAML definition
    Create {
        /// Definition file
        file: PathBuf,
    },

    /// Apply a partial update from a JSON or YAML file
    Update {
        /// Configuration name or ID
        config: String,
        /// Patch file
        file: PathBuf,
    },

    /// Delete a configuration
    Delete {
        /// Configuration name or ID
        config: String,
    },

    /// Copy a configuration under a new name
    Duplicate {
        /// Configuration name or ID
        config: String,
    },

    /// Mark a configuration active
    Activate {
        /// Configuration name or ID
        config: String,
    },

    /// Mark a configuration inactive
    Deactivate {
        /// Configuration name or ID
        config: String,
    },

    /// Write all configurations to a bundle file
    Export {
        /// Output file path
        output: PathBuf,

        /// Bundle format (defaults to the file extension)
        #[arg(short, long, value_enum)]
        format: Option<BundleFormatArg>,
    },

    /// Add the configurations from a bundle file
    Import {
        /// Bundle file path
        file: PathBuf,

        /// Bundle format (defaults to the file extension)
        #[arg(short, long, value_enum)]
        format: Option<BundleFormatArg>,
    },
}

/// Handle configuration commands
pub fn handle_config_command(engine: &ExportEngine, cmd: ConfigCommands) -> LedgerResult<()> {
    let store = engine.configs();

    match cmd {
        ConfigCommands::List { active } => {
            let mut configs = store.list()?;
            if active {
                configs.retain(|c| c.is_active);
            }
            println!("{}", format_config_list(&configs).trim_end());
        }
        ConfigCommands::Show { config } => {
            let config = resolve_config(engine, &config)?;
            print!("{}", format_config_details(&config));
        }
        ConfigCommands::Create { file } => {
            let draft: NewExportConfig = read_document(&file)?;
            if draft.name.trim().is_empty() {
                return Err(LedgerError::Validation(
                    "Configuration name cannot be empty".into(),
                ));
            }
            let config = store.create(draft)?;
            println!("Created export configuration: {} ({})", config.name, config.id);
        }
        ConfigCommands::Update { config, file } => {
            let config = resolve_config(engine, &config)?;
            let patch: ConfigPatch = read_document(&file)?;
            let updated = store.update(config.id, patch)?;
            println!("Updated export configuration: {} ({})", updated.name, updated.id);
        }
        ConfigCommands::Delete { config } => {
            let config = resolve_config(engine, &config)?;
            let removed = store.delete(config.id)?;
            println!("Deleted export configuration: {}", removed.name);
        }
        ConfigCommands::Duplicate { config } => {
            let config = resolve_config(engine, &config)?;
            let copy = store.duplicate(config.id)?;
            println!("Created export configuration: {} ({})", copy.name, copy.id);
        }
        ConfigCommands::Activate { config } => {
            let config = resolve_config(engine, &config)?;
            store.set_active(config.id, true)?;
            println!("Activated: {}", config.name);
        }
        ConfigCommands::Deactivate { config } => {
            let config = resolve_config(engine, &config)?;
            store.set_active(config.id, false)?;
            println!("Deactivated: {}", config.name);
        }
        ConfigCommands::Export { output, format } => {
            let format = format
                .map(BundleFormat::from)
                .unwrap_or_else(|| BundleFormat::from_extension(&output));
            let file = File::create(&output).map_err(|e| {
                LedgerError::Io(format!("Failed to create file {}: {}", output.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            let count = store.export_bundle(format, &mut writer)?;
            writer.flush()?;
            println!("Exported {} configurations to: {}", count, output.display());
        }
        ConfigCommands::Import { file, format } => {
            let format = format
                .map(BundleFormat::from)
                .unwrap_or_else(|| BundleFormat::from_extension(&file));
            let text = read_file(&file)?;
            let imported = store.import_bundle(&text, format)?;
            println!("Imported {} configurations from: {}", imported.len(), file.display());
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> LedgerResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Parse a JSON or YAML document, chosen by file extension
fn read_document<T: DeserializeOwned>(path: &Path) -> LedgerResult<T> {
    let text = read_file(path)?;
    match BundleFormat::from_extension(path) {
        BundleFormat::Yaml => Ok(serde_yaml::from_str(&text)?),
        BundleFormat::Json => Ok(serde_json::from_str(&text)?),
    }
}
