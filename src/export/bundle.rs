//! Configuration bundles
//!
//! Exports export configurations themselves to JSON or YAML so they can be
//! shared or restored, with schema versioning. Imported configurations get
//! fresh ids from the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{ExportConfig, NewExportConfig};

/// Current bundle schema version
pub const BUNDLE_SCHEMA_VERSION: &str = "1.0.0";

/// Serialization used for a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    Json,
    Yaml,
}

impl BundleFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_extension(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Portable set of export configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBundle {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the bundle
    pub app_version: String,

    pub configs: Vec<NewExportConfig>,
}

impl ConfigBundle {
    pub fn from_configs(configs: &[ExportConfig]) -> Self {
        Self {
            schema_version: BUNDLE_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            configs: configs.iter().cloned().map(NewExportConfig::from).collect(),
        }
    }

    /// Validate the bundle structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != BUNDLE_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                BUNDLE_SCHEMA_VERSION, self.schema_version
            ));
        }

        for config in &self.configs {
            if config.name.trim().is_empty() {
                return Err("Bundle contains a configuration without a name".to_string());
            }
            if config.columns.is_empty() {
                return Err(format!("Configuration '{}' has no columns", config.name));
            }
        }

        Ok(())
    }
}

/// Write configurations as a bundle
pub fn write_bundle<W: Write>(
    configs: &[ExportConfig],
    format: BundleFormat,
    writer: &mut W,
) -> LedgerResult<()> {
    let bundle = ConfigBundle::from_configs(configs);

    match format {
        BundleFormat::Json => serde_json::to_writer_pretty(writer, &bundle)?,
        BundleFormat::Yaml => {
            writeln!(writer, "# ledger-export configuration bundle")?;
            writeln!(writer, "# Generated: {}", bundle.exported_at)?;
            writeln!(writer, "# App Version: {}", bundle.app_version)?;
            writeln!(writer)?;
            serde_yaml::to_writer(writer, &bundle)?;
        }
    }

    Ok(())
}

/// Parse and validate a bundle
pub fn read_bundle(text: &str, format: BundleFormat) -> LedgerResult<ConfigBundle> {
    let bundle: ConfigBundle = match format {
        BundleFormat::Json => serde_json::from_str(text)?,
        BundleFormat::Yaml => serde_yaml::from_str(text)?,
    };

    bundle.validate().map_err(LedgerError::Validation)?;

    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_configs;

    #[test]
    fn test_yaml_round_trip() {
        let configs = default_configs(Utc::now());
        let mut out = Vec::new();
        write_bundle(&configs, BundleFormat::Yaml, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# ledger-export configuration bundle"));
        assert!(text.contains("Full Transaction Ledger"));

        let bundle = read_bundle(&text, BundleFormat::Yaml).unwrap();
        assert_eq!(bundle.configs.len(), 2);
        assert_eq!(bundle.configs[0].columns, configs[0].columns);
    }

    #[test]
    fn test_json_round_trip() {
        let configs = default_configs(Utc::now());
        let mut out = Vec::new();
        write_bundle(&configs, BundleFormat::Json, &mut out).unwrap();

        let bundle = read_bundle(std::str::from_utf8(&out).unwrap(), BundleFormat::Json).unwrap();
        assert_eq!(bundle.configs[1].name, "Monthly Category Summary");
        assert_eq!(bundle.configs[1].formatting, configs[1].formatting);
    }

    #[test]
    fn test_rejects_schema_mismatch() {
        let mut bundle = ConfigBundle::from_configs(&default_configs(Utc::now()));
        bundle.schema_version = "0.1.0".into();
        let text = serde_json::to_string(&bundle).unwrap();

        let err = read_bundle(&text, BundleFormat::Json).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_format_from_extension() {
        use std::path::Path;
        assert_eq!(BundleFormat::from_extension(Path::new("a.yml")), BundleFormat::Yaml);
        assert_eq!(BundleFormat::from_extension(Path::new("a.json")), BundleFormat::Json);
        assert_eq!(BundleFormat::from_extension(Path::new("a")), BundleFormat::Json);
    }
}
