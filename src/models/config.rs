//! Export configuration model
//!
//! An export configuration is a named, reusable description of what to
//! export (data source, filters, columns) and how (format, formatting).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::filters::ExportFilters;
use super::ids::ConfigId;
use super::schedule::ExportSchedule;

/// Output format of an export
///
/// Unknown names survive deserialization so that a stored configuration
/// with a bad format fails when it is run rather than when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExportFormat {
    /// Spreadsheet workbook (.xlsx)
    Excel,
    /// Delimited text (.csv)
    Csv,
    /// Structured object (.json)
    Json,
    /// Markup (.xml)
    Xml,
    /// Anything else
    Unknown(String),
}

impl ExportFormat {
    /// Parse a format name (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "excel" | "xlsx" => Self::Excel,
            "csv" => Self::Csv,
            "json" => Self::Json,
            "xml" => Self::Xml,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Excel => "excel",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Unknown(name) => name,
        }
    }

    /// File extension for produced files
    pub fn extension(&self) -> &str {
        match self {
            Self::Excel => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Unknown(name) => name,
        }
    }

    /// MIME type handed to the sink alongside the payload
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Unknown(_) => "application/octet-stream",
        }
    }
}

impl From<String> for ExportFormat {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ExportFormat> for String {
    fn from(format: ExportFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of domain records an export reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Transactions,
    Accounts,
    Budgets,
    Goals,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transactions => write!(f, "transactions"),
            Self::Accounts => write!(f, "accounts"),
            Self::Budgets => write!(f, "budgets"),
            Self::Goals => write!(f, "goals"),
        }
    }
}

/// How a column's value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Boolean,
    Percentage,
}

/// Statistic computed for a column in the summary row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

/// One typed output field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportColumn {
    /// Source field name in the raw record
    pub key: String,

    /// Display name
    pub title: String,

    #[serde(rename = "type", default)]
    pub column_type: ColumnType,

    /// Pattern overriding the formatting default for this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Display width in characters (spreadsheet output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub sortable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

fn default_true() -> bool {
    true
}

impl ExportColumn {
    /// Create a visible, sortable column
    pub fn new(key: impl Into<String>, title: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            column_type,
            format: None,
            width: None,
            visible: true,
            sortable: true,
            aggregation: None,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Presentation options shared by all codecs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFormatting {
    #[serde(default = "default_true")]
    pub include_headers: bool,

    #[serde(default)]
    pub include_footer: bool,

    #[serde(default)]
    pub include_summary: bool,

    /// strftime pattern for date columns
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Number pattern for currency columns, e.g. `$#,##0.00` or `R$ #,##0.00`
    #[serde(default = "default_currency_format")]
    pub currency_format: String,

    /// Number pattern for number columns
    #[serde(default = "default_number_format")]
    pub number_format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,

    /// Opaque styling hints, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<serde_json::Value>,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_currency_format() -> String {
    "$#,##0.00".to_string()
}

fn default_number_format() -> String {
    "#,##0.##".to_string()
}

impl Default for ExportFormatting {
    fn default() -> Self {
        Self {
            include_headers: true,
            include_footer: false,
            include_summary: false,
            date_format: default_date_format(),
            currency_format: default_currency_format(),
            number_format: default_number_format(),
            sheet_name: None,
            styling: None,
        }
    }
}

/// A named, persisted export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub id: ConfigId,
    pub name: String,
    pub format: ExportFormat,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default)]
    pub filters: ExportFilters,
    pub columns: Vec<ExportColumn>,
    #[serde(default)]
    pub formatting: ExportFormatting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ExportSchedule>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exported: Option<DateTime<Utc>>,
}

impl ExportConfig {
    /// Visible columns in output order
    pub fn visible_columns(&self) -> Vec<ExportColumn> {
        self.columns.iter().filter(|c| c.visible).cloned().collect()
    }

    /// Apply a partial update; fields absent from the patch are kept
    pub fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if let Some(data_source) = patch.data_source {
            self.data_source = data_source;
        }
        if let Some(filters) = patch.filters {
            self.filters = filters;
        }
        if let Some(columns) = patch.columns {
            self.columns = columns;
        }
        if let Some(formatting) = patch.formatting {
            self.formatting = formatting;
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = schedule;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}

/// Fields supplied when creating a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExportConfig {
    pub name: String,
    pub format: ExportFormat,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default)]
    pub filters: ExportFilters,
    pub columns: Vec<ExportColumn>,
    #[serde(default)]
    pub formatting: ExportFormatting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ExportSchedule>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewExportConfig {
    pub fn new(name: impl Into<String>, format: ExportFormat, columns: Vec<ExportColumn>) -> Self {
        Self {
            name: name.into(),
            format,
            data_source: DataSource::default(),
            filters: ExportFilters::default(),
            columns,
            formatting: ExportFormatting::default(),
            schedule: None,
            is_active: true,
        }
    }

    /// Turn the draft into a stored configuration with a fresh id
    pub fn into_config(self, created_at: DateTime<Utc>) -> ExportConfig {
        let mut schedule = self.schedule;
        if let Some(schedule) = schedule.as_mut() {
            schedule.refresh_next_run(created_at);
        }

        ExportConfig {
            id: ConfigId::new(),
            name: self.name,
            format: self.format,
            data_source: self.data_source,
            filters: self.filters,
            columns: self.columns,
            formatting: self.formatting,
            schedule,
            is_active: self.is_active,
            created_at,
            last_exported: None,
        }
    }
}

impl From<ExportConfig> for NewExportConfig {
    fn from(config: ExportConfig) -> Self {
        Self {
            name: config.name,
            format: config.format,
            data_source: config.data_source,
            filters: config.filters,
            columns: config.columns,
            formatting: config.formatting,
            schedule: config.schedule,
            is_active: config.is_active,
        }
    }
}

/// Partial update merged into an existing configuration
///
/// `schedule: Some(None)` removes the schedule; in a document that is
/// `"schedule": null`, while an absent key leaves it alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ExportFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ExportColumn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<ExportFormatting>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<Option<ExportSchedule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Maps a present key to `Some`, so an explicit null becomes `Some(None)`
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Built-in configurations created for a fresh store
pub fn default_configs(created_at: DateTime<Utc>) -> Vec<ExportConfig> {
    let ledger = NewExportConfig {
        name: "Full Transaction Ledger".to_string(),
        format: ExportFormat::Excel,
        data_source: DataSource::Transactions,
        filters: ExportFilters::default(),
        columns: vec![
            ExportColumn::new("date", "Date", ColumnType::Date).with_width(12),
            ExportColumn::new("description", "Description", ColumnType::Text).with_width(30),
            ExportColumn::new("category", "Category", ColumnType::Text).with_width(20),
            ExportColumn::new("amount", "Amount", ColumnType::Currency)
                .with_width(15)
                .with_aggregation(Aggregation::Sum),
            ExportColumn::new("account", "Account", ColumnType::Text).with_width(20),
            ExportColumn::new("type", "Type", ColumnType::Text).with_width(10),
        ],
        formatting: ExportFormatting {
            include_summary: true,
            sheet_name: Some("Transactions".to_string()),
            ..ExportFormatting::default()
        },
        schedule: None,
        is_active: true,
    };

    let summary = NewExportConfig {
        name: "Monthly Category Summary".to_string(),
        format: ExportFormat::Excel,
        data_source: DataSource::Transactions,
        filters: ExportFilters::default(),
        columns: vec![
            ExportColumn::new("category", "Category", ColumnType::Text).with_width(25),
            ExportColumn::new("count", "Transactions", ColumnType::Number).with_width(15),
            ExportColumn::new("total", "Total", ColumnType::Currency)
                .with_width(15)
                .with_aggregation(Aggregation::Sum),
            ExportColumn::new("average", "Average", ColumnType::Currency)
                .with_width(15)
                .with_aggregation(Aggregation::Avg),
            ExportColumn::new("percentage", "Share", ColumnType::Percentage).with_width(10),
        ],
        formatting: ExportFormatting {
            include_summary: true,
            sheet_name: Some("Category Summary".to_string()),
            ..ExportFormatting::default()
        },
        schedule: None,
        is_active: true,
    };

    vec![ledger.into_config(created_at), summary.into_config(created_at)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_and_serialize() {
        assert_eq!(ExportFormat::parse("XLSX"), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse("csv"), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::parse("pdf"),
            ExportFormat::Unknown("pdf".to_string())
        );

        let json = serde_json::to_string(&ExportFormat::Xml).unwrap();
        assert_eq!(json, r#""xml""#);
        let unknown: ExportFormat = serde_json::from_str(r#""pdf""#).unwrap();
        assert_eq!(unknown, ExportFormat::Unknown("pdf".to_string()));
    }

    #[test]
    fn test_column_serde_defaults() {
        let column: ExportColumn =
            serde_json::from_str(r#"{"key": "amount", "title": "Amount", "type": "currency"}"#)
                .unwrap();
        assert_eq!(column.column_type, ColumnType::Currency);
        assert!(column.visible);
        assert!(column.aggregation.is_none());
    }

    #[test]
    fn test_default_configs() {
        let configs = default_configs(Utc::now());
        assert_eq!(configs.len(), 2);
        assert_ne!(configs[0].id, configs[1].id);

        let ledger_keys: Vec<_> = configs[0].columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            ledger_keys,
            vec!["date", "description", "category", "amount", "account", "type"]
        );
        assert_eq!(configs[0].columns[3].aggregation, Some(Aggregation::Sum));

        let summary_keys: Vec<_> = configs[1].columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            summary_keys,
            vec!["category", "count", "total", "average", "percentage"]
        );
        assert_eq!(configs[1].columns[3].aggregation, Some(Aggregation::Avg));
    }

    #[test]
    fn test_apply_patch_merges_present_fields() {
        let mut config = default_configs(Utc::now()).remove(0);
        let original_columns = config.columns.clone();

        config.apply_patch(ConfigPatch {
            name: Some("Renamed".into()),
            format: Some(ExportFormat::Csv),
            ..ConfigPatch::default()
        });

        assert_eq!(config.name, "Renamed");
        assert_eq!(config.format, ExportFormat::Csv);
        assert_eq!(config.columns, original_columns);
    }

    #[test]
    fn test_patch_can_clear_schedule() {
        let mut config = default_configs(Utc::now()).remove(0);
        config.schedule = Some(ExportSchedule::new(
            crate::models::ScheduleFrequency::Daily,
            chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        ));

        config.apply_patch(ConfigPatch {
            schedule: Some(None),
            ..ConfigPatch::default()
        });
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_patch_null_schedule_clears() {
        let clear: ConfigPatch = serde_json::from_str(r#"{"schedule": null}"#).unwrap();
        assert_eq!(clear.schedule, Some(None));

        let untouched: ConfigPatch = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert_eq!(untouched.schedule, None);

        let yaml: ConfigPatch = serde_yaml::from_str("schedule: ~\n").unwrap();
        assert_eq!(yaml.schedule, Some(None));

        let mut config = default_configs(Utc::now()).remove(0);
        config.schedule = Some(ExportSchedule::new(
            crate::models::ScheduleFrequency::Weekly,
            chrono::NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        ));
        config.apply_patch(untouched);
        assert!(config.schedule.is_some());
        config.apply_patch(clear);
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_visible_columns() {
        let mut config = default_configs(Utc::now()).remove(0);
        config.columns[1] = config.columns[1].clone().hidden();
        let visible = config.visible_columns();
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|c| c.key != "description"));
    }
}
