//! Export configuration display formatting
//!
//! Formats configurations and run results for terminal output.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Aggregation, ColumnType, ExportConfig, ExportResult};

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Columns")]
    columns: usize,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Last Export")]
    last_exported: String,
}

impl From<&ExportConfig> for ConfigRow {
    fn from(config: &ExportConfig) -> Self {
        Self {
            id: config.id.to_string(),
            name: config.name.clone(),
            format: config.format.to_string(),
            source: config.data_source.to_string(),
            columns: config.visible_columns().len(),
            active: if config.is_active { "Yes" } else { "No" },
            last_exported: config
                .last_exported
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

/// Format configurations as a table
pub fn format_config_list(configs: &[ExportConfig]) -> String {
    if configs.is_empty() {
        return "No export configurations found.".to_string();
    }

    let mut table = Table::new(configs.iter().map(ConfigRow::from));
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single configuration's details
pub fn format_config_details(config: &ExportConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("Export: {}\n", config.name));
    output.push_str(&format!("  ID:          {}\n", config.id));
    output.push_str(&format!("  Format:      {}\n", config.format));
    output.push_str(&format!("  Data Source: {}\n", config.data_source));
    output.push_str(&format!(
        "  Active:      {}\n",
        if config.is_active { "Yes" } else { "No" }
    ));

    output.push('\n');
    output.push_str("  Columns:\n");
    for column in &config.columns {
        let mut notes = Vec::new();
        if let Some(aggregation) = column.aggregation {
            notes.push(aggregation_label(aggregation).to_string());
        }
        if !column.visible {
            notes.push("hidden".to_string());
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", notes.join(", "))
        };
        output.push_str(&format!(
            "    {:<16} {:<20} {}{}\n",
            column.key,
            column.title,
            type_label(column.column_type),
            notes
        ));
    }

    if !config.filters.is_empty() {
        output.push('\n');
        output.push_str("  Filters:\n");
        if let Some(range) = &config.filters.date_range {
            output.push_str(&format!("    Dates:      {} to {}\n", range.start, range.end));
        }
        if let Some(categories) = &config.filters.categories {
            output.push_str(&format!("    Categories: {}\n", categories.join(", ")));
        }
        if let Some(accounts) = &config.filters.accounts {
            output.push_str(&format!("    Accounts:   {}\n", accounts.join(", ")));
        }
        if let Some(tags) = &config.filters.tags {
            output.push_str(&format!("    Tags:       {}\n", tags.join(", ")));
        }
        if let Some(status) = &config.filters.status {
            output.push_str(&format!("    Status:     {}\n", status.join(", ")));
        }
        if let Some(range) = &config.filters.amount_range {
            output.push_str(&format!(
                "    Amount:     {} to {}\n",
                range.min.map_or("-".to_string(), |v| v.to_string()),
                range.max.map_or("-".to_string(), |v| v.to_string())
            ));
        }
        for key in config.filters.custom.keys() {
            output.push_str(&format!("    Custom:     {}\n", key));
        }
    }

    if let Some(schedule) = &config.schedule {
        output.push('\n');
        output.push_str(&format!(
            "  Schedule:    {} at {}\n",
            schedule.frequency,
            schedule.time.format("%H:%M")
        ));
        if let Some(next) = schedule.next_run {
            output.push_str(&format!("  Next Run:    {}\n", next.format("%Y-%m-%d %H:%M UTC")));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:     {}\n",
        config.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if let Some(at) = config.last_exported {
        output.push_str(&format!("  Last Export: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }

    output
}

/// One-paragraph report of a finished run
pub fn format_export_result(result: &ExportResult) -> String {
    format!(
        "Exported {} of {} records ({} columns) as {}\n  {} bytes, {}, {} ms\n",
        result.row_count,
        result.metadata.original_count,
        result.metadata.column_count,
        result.filename,
        result.size,
        result.content_type(),
        result.metadata.elapsed_ms
    )
}

fn type_label(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "text",
        ColumnType::Number => "number",
        ColumnType::Currency => "currency",
        ColumnType::Date => "date",
        ColumnType::Boolean => "boolean",
        ColumnType::Percentage => "percentage",
    }
}

fn aggregation_label(aggregation: Aggregation) -> &'static str {
    match aggregation {
        Aggregation::Sum => "sum",
        Aggregation::Avg => "avg",
        Aggregation::Count => "count",
        Aggregation::Min => "min",
        Aggregation::Max => "max",
    }
}
