//! Output formatting for CLI commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Render a vec of Tabled + Serialize items in the chosen mode.
pub fn render_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<String> {
    let rendered = match mode {
        OutputMode::Table if items.is_empty() => "(no results)".to_string(),
        OutputMode::Table => Table::new(items).to_string(),
        OutputMode::Json => serde_json::to_string_pretty(items)?,
    };
    Ok(rendered)
}

pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    println!("{}", render_items(items, mode)?);
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize>(item: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(item)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        name: String,
        rounds: u32,
    }

    #[test]
    fn test_empty_table() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render_items(&rows, OutputMode::Table).unwrap(), "(no results)");
        assert_eq!(render_items(&rows, OutputMode::Json).unwrap(), "[]");
    }

    #[test]
    fn test_table_and_json_modes() {
        let rows = vec![Row {
            name: "Hopper-v3-ppo".to_string(),
            rounds: 50,
        }];

        let table = render_items(&rows, OutputMode::Table).unwrap();
        assert!(table.contains("name"));
        assert!(table.contains("Hopper-v3-ppo"));

        let json: serde_json::Value =
            serde_json::from_str(&render_items(&rows, OutputMode::Json).unwrap()).unwrap();
        assert_eq!(json[0]["rounds"], 50);
    }
}
