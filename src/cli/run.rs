//! CLI command for running an export
//!
//! Reads records from a JSON file, runs the configuration over them and
//! writes the produced file into the output directory.

use clap::Args;
use std::path::PathBuf;

use crate::config::ExportPaths;
use crate::display::format_export_result;
use crate::engine::ExportEngine;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Record;
use crate::storage::write_atomic;

use super::resolve_config;

/// Arguments for `run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration name or ID
    pub config: String,

    /// JSON file holding an array of record objects
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory to write the export into (defaults to the exports directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the run command, returning the path written
pub fn handle_run_command(
    engine: &ExportEngine,
    paths: &ExportPaths,
    args: RunArgs,
) -> LedgerResult<PathBuf> {
    let config = resolve_config(engine, &args.config)?;

    let text = std::fs::read_to_string(&args.input).map_err(|e| {
        LedgerError::Io(format!("Failed to read {}: {}", args.input.display(), e))
    })?;
    let records: Vec<Record> = serde_json::from_str(&text).map_err(|e| {
        LedgerError::Validation(format!(
            "{} must contain a JSON array of objects: {}",
            args.input.display(),
            e
        ))
    })?;

    let result = engine.run(config.id, &records)?;

    let output_dir = args
        .output
        .unwrap_or_else(|| engine.settings().output_dir(paths));
    let path = output_dir.join(&result.filename);
    write_atomic(&path, result.payload.as_bytes())?;

    print!("{}", format_export_result(&result));
    println!("  Saved to: {}", path.display());

    Ok(path)
}
