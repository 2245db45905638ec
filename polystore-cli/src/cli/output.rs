// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Snapshot formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde_json::json;

/// Rows of one listing, rendered as a table or as JSON
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn new(title: impl Into<String>, columns: Vec<&'static str>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Formatter for snapshot listings
pub struct SnapshotFormatter;

impl SnapshotFormatter {
    pub fn format(listing: &Listing, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(listing),
            OutputFormat::Json => Self::format_json(listing),
        }
    }

    fn format_table(listing: &Listing) -> String {
        if listing.rows.is_empty() {
            return format!("{}\n", format!("No {} found", listing.title).yellow());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", listing.title.bold().green()));
        output.push_str(&format!("Rows: {}\n\n", listing.rows.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            listing
                .columns
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in &listing.rows {
            table.add_row(row.clone());
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn format_json(listing: &Listing) -> String {
        let rows: Vec<serde_json::Value> = listing
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = listing
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| (col.to_string(), json!(value)))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        let document = json!({
            "title": listing.title,
            "rows": rows,
            "row_count": listing.rows.len(),
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    /// Numbered drop sequence
    pub fn format_plan(subject: &str, plan: &[String]) -> String {
        let mut output = format!(
            "{} {} ({} object(s))\n",
            "Dropping".bold().yellow(),
            subject,
            plan.len()
        );
        for (i, step) in plan.iter().enumerate() {
            output.push_str(&format!("  {:>3}. {}\n", i + 1, step));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        let mut listing = Listing::new("namespaces", vec!["id", "name"]);
        listing.push(vec!["1".to_string(), "public".to_string()]);
        listing
    }

    #[test]
    fn test_json_uses_column_names() {
        let output = SnapshotFormatter::format(&listing(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["row_count"], 1);
        assert_eq!(parsed["rows"][0]["name"], "public");
    }

    #[test]
    fn test_table_lists_rows() {
        colored::control::set_override(false);
        let output = SnapshotFormatter::format(&listing(), OutputFormat::Table);
        assert!(output.contains("public"));
        assert!(output.contains("Rows: 1"));

        let empty = Listing::new("tables", vec!["id"]);
        assert!(SnapshotFormatter::format(&empty, OutputFormat::Table).contains("No tables found"));
    }

    #[test]
    fn test_plan_is_numbered() {
        colored::control::set_override(false);
        let plan = vec!["entity 3".to_string(), "namespace 1".to_string()];
        let output = SnapshotFormatter::format_plan("namespace 'public'", &plan);
        assert!(output.contains("  1. entity 3"));
        assert!(output.contains("  2. namespace 1"));
    }
}
