//! `rlcost plot` and `rlcost extract`

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::output::{print_items, OutputMode};
use crate::config::AppConfig;
use crate::domain::Algorithm;
use crate::metrics::MetricsExtractor;
use crate::report::{collect, render_all};
use crate::trainer::replay::parse_result_lines;

pub fn plot(config: &AppConfig, logs: Option<PathBuf>, imgs: Option<PathBuf>, mode: OutputMode) -> Result<()> {
    let logs_dir = logs.unwrap_or_else(|| config.report.logs_dir.clone());
    let imgs_dir = imgs.unwrap_or_else(|| config.report.imgs_dir.clone());
    let envs = config.training.env_names();

    let data = collect(&logs_dir, &envs, &Algorithm::ALL, &config.report.csv_suffix)?;
    if data.runs.is_empty() {
        warn!("No round logs found in {}", logs_dir.display());
    }

    let written = render_all(&imgs_dir, &data, &envs, &Algorithm::ALL)
        .with_context(|| format!("Failed to render charts into {}", imgs_dir.display()))?;

    print_items(&data.total_costs(), mode)?;
    if mode == OutputMode::Table {
        for path in &written {
            println!("  wrote {}", path.display());
        }
    }
    Ok(())
}

/// Pick the payload of `round` from a results file
///
/// A file holding one JSON document is the payload of round 1; otherwise
/// the file is read as JSON lines and `round` selects the line. A `null`
/// payload or a round past the end yields `None`.
pub fn select_payload(content: &str, round: u32) -> Result<Option<Value>> {
    let payload = match serde_json::from_str::<Value>(content) {
        Ok(value) => (round == 1).then_some(value),
        Err(_) => {
            let mut lines = parse_result_lines(content)?;
            let idx = (round as usize).checked_sub(1);
            match idx {
                Some(idx) if idx < lines.len() => Some(lines.swap_remove(idx)),
                _ => None,
            }
        }
    };
    Ok(payload.filter(|value| !value.is_null()))
}

pub async fn extract(
    config: &AppConfig,
    algorithm: Algorithm,
    input: &Path,
    round: u32,
    mode: OutputMode,
) -> Result<()> {
    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let payload = select_payload(&content, round)?;

    let extractor = MetricsExtractor::from_config(config);
    let record = extractor.process(algorithm, Some(round), payload.as_ref())?;

    match record {
        Some(record) => print_items(&[record], mode)?,
        None => match mode {
            OutputMode::Table => println!("(no results)"),
            OutputMode::Json => println!("null"),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_document_is_the_payload() {
        let payload = select_payload(r#"{"time_this_iter_s": 1.5}"#, 1).unwrap();
        assert_eq!(payload, Some(json!({"time_this_iter_s": 1.5})));
    }

    #[test]
    fn test_single_line_has_no_later_rounds() {
        assert_eq!(select_payload("{\"round\": 1}\n", 3).unwrap(), None);
        assert_eq!(select_payload("{\"round\": 1}\n", 1).unwrap(), Some(json!({"round": 1})));
    }

    #[test]
    fn test_json_lines_select_round() {
        let content = "{\"round\": 1}\n\n{\"round\": 2}\n";
        assert_eq!(select_payload(content, 2).unwrap(), Some(json!({"round": 2})));
        assert_eq!(select_payload(content, 3).unwrap(), None);
        assert_eq!(select_payload(content, 0).unwrap(), None);
    }

    #[test]
    fn test_null_payload_is_absent() {
        assert_eq!(select_payload("null", 1).unwrap(), None);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(select_payload("not json", 1).is_err());
    }
}
