//! Replay Backend
//!
//! Re-drives experiments from recorded training results, one JSON result
//! object per line (the layout the framework writes to `result.json`).
//! Logs are looked up as `<results_dir>/<env>~<algo>.json`.

use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::backend::{Trainer, TrainingBackend};
use super::config::TrainerConfig;
use crate::domain::Algorithm;
use crate::error::{Result, RlcostError};

#[derive(Debug, Clone)]
pub struct ReplayBackend {
    results_dir: PathBuf,
}

impl ReplayBackend {
    pub fn new<P: AsRef<Path>>(results_dir: P) -> Self {
        Self {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    /// Recorded result log for an experiment
    pub fn results_path(&self, env: &str, algorithm: Algorithm) -> PathBuf {
        self.results_dir.join(format!("{}~{}.json", env, algorithm))
    }
}

/// Bare tokens Python's json module writes for non-finite floats
const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace non-finite float tokens outside string literals with `null`
pub(crate) fn nullify_non_finite(line: &str) -> Cow<'_, str> {
    if !line.contains("NaN") && !line.contains("Infinity") {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(token) = NON_FINITE_TOKENS.iter().find(|token| rest.starts_with(*token)) {
                out.push_str("null");
                rest = &rest[token.len()..];
                continue;
            }
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Parse a JSON-lines result log, skipping blank lines
///
/// `NaN` and `Infinity` values become `null`.
pub fn parse_result_lines(content: &str) -> Result<Vec<Value>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(&nullify_non_finite(line)).map_err(RlcostError::from))
        .collect()
}

#[async_trait]
impl TrainingBackend for ReplayBackend {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn init(&self) -> Result<()> {
        if !self.results_dir.is_dir() {
            return Err(RlcostError::Backend(format!(
                "results directory {} not found",
                self.results_dir.display()
            )));
        }
        Ok(())
    }

    async fn build(&self, config: &TrainerConfig) -> Result<Box<dyn Trainer>> {
        let source = self.results_path(&config.env, config.algorithm);
        let content = tokio::fs::read_to_string(&source).await.map_err(|e| {
            RlcostError::Backend(format!("cannot read {}: {}", source.display(), e))
        })?;

        let rounds: VecDeque<Value> = parse_result_lines(&content)?.into();
        info!(
            "Replaying {} recorded rounds from {}",
            rounds.len(),
            source.display()
        );

        Ok(Box::new(ReplayTrainer {
            rounds,
            source,
            served: 0,
        }))
    }
}

/// Trainer serving recorded results in order
#[derive(Debug)]
pub struct ReplayTrainer {
    rounds: VecDeque<Value>,
    source: PathBuf,
    served: usize,
}

#[async_trait]
impl Trainer for ReplayTrainer {
    async fn train(&mut self) -> Result<Value> {
        let result = self.rounds.pop_front().ok_or_else(|| {
            RlcostError::Backend(format!(
                "recorded results in {} exhausted after {} rounds",
                self.source.display(),
                self.served
            ))
        })?;
        self.served += 1;
        Ok(result)
    }

    async fn stop(&mut self) -> Result<()> {
        debug!(
            "Replay of {} stopped after {} rounds",
            self.source.display(),
            self.served
        );
        Ok(())
    }
}
