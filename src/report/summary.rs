//! Offline report data
//!
//! Loads the round logs of every (environment, algorithm) combination that
//! exists on disk. Missing logs are skipped with a warning.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::warn;

use super::csv_log::{log_path, read_rounds};
use crate::domain::{Algorithm, RoundRecord};
use crate::error::Result;

/// Round log of one experiment
#[derive(Debug, Clone, PartialEq)]
pub struct RunLog {
    pub env: String,
    pub algorithm: Algorithm,
    pub rounds: Vec<RoundRecord>,
}

impl RunLog {
    /// Chart label of the combination, e.g. `Hopper-v3-ppo`
    pub fn label(&self) -> String {
        format!("{}-{}", self.env, self.algorithm)
    }

    pub fn total_cost(&self) -> f64 {
        self.rounds.iter().map(|round| round.cost).sum()
    }

    /// `(round_id, mean reward)` series
    pub fn mean_reward_series(&self) -> Vec<(f64, f64)> {
        self.rounds
            .iter()
            .map(|round| (round.round_id as f64, round.eval_reward_mean))
            .collect()
    }
}

/// Total cost row of the report table
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CostRow {
    pub combination: String,
    pub rounds: usize,
    #[tabled(display = "display_dollars")]
    pub total_cost: f64,
}

fn display_dollars(cost: &f64) -> String {
    format!("${:.4}", cost)
}

/// Everything the offline report needs
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub runs: Vec<RunLog>,
    /// Expected logs that were not found
    pub missing: Vec<PathBuf>,
}

impl ReportData {
    pub fn run(&self, env: &str, algorithm: Algorithm) -> Option<&RunLog> {
        self.runs
            .iter()
            .find(|run| run.env == env && run.algorithm == algorithm)
    }

    /// Total cost per combination, in load order
    pub fn total_costs(&self) -> Vec<CostRow> {
        self.runs
            .iter()
            .map(|run| CostRow {
                combination: run.label(),
                rounds: run.rounds.len(),
                total_cost: run.total_cost(),
            })
            .collect()
    }

    pub fn cost_table(&self) -> String {
        Table::new(self.total_costs()).to_string()
    }
}

/// Load every existing round log for `envs` x `algorithms`
pub fn collect<P: AsRef<Path>>(
    logs_dir: P,
    envs: &[String],
    algorithms: &[Algorithm],
    suffix: &str,
) -> Result<ReportData> {
    let mut data = ReportData::default();

    for env in envs {
        for &algorithm in algorithms {
            let path = log_path(logs_dir.as_ref(), env, algorithm, suffix);
            if !path.exists() {
                warn!("File not found: {}", path.display());
                data.missing.push(path);
                continue;
            }

            data.runs.push(RunLog {
                env: env.clone(),
                algorithm,
                rounds: read_rounds(&path)?,
            });
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::csv_log::write_rounds;

    fn record(round_id: u32, cost: f64) -> RoundRecord {
        RoundRecord {
            round_id,
            duration: 10.0,
            episodes_this_iter: 1,
            learner_time: 1.0,
            actor_time: 2.0,
            eval_reward_max: 3.0,
            eval_reward_mean: round_id as f64,
            eval_reward_min: 1.0,
            learner_loss: 0.5,
            cost,
        }
    }

    #[test]
    fn test_collect_skips_missing_logs() {
        let dir = std::env::temp_dir().join(format!("rlcost-report-{}", uuid::Uuid::new_v4()));
        write_rounds(
            log_path(&dir, "Hopper-v3", Algorithm::Ppo, ""),
            &[record(1, 0.25), record(2, 0.5)],
        )
        .unwrap();

        let envs = vec!["Hopper-v3".to_string(), "Walker2d-v3".to_string()];
        let data = collect(&dir, &envs, &[Algorithm::Pg, Algorithm::Ppo], "").unwrap();

        assert_eq!(data.runs.len(), 1);
        assert_eq!(data.missing.len(), 3);

        let run = data.run("Hopper-v3", Algorithm::Ppo).unwrap();
        assert_eq!(run.label(), "Hopper-v3-ppo");
        assert!((run.total_cost() - 0.75).abs() < 1e-12);
        assert_eq!(run.mean_reward_series(), vec![(1.0, 1.0), (2.0, 2.0)]);

        let costs = data.total_costs();
        assert_eq!(costs[0].combination, "Hopper-v3-ppo");
        assert_eq!(costs[0].rounds, 2);
        assert!(data.cost_table().contains("$0.7500"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_collect_with_no_logs_is_empty() {
        let dir = std::env::temp_dir().join(format!("rlcost-report-{}", uuid::Uuid::new_v4()));
        let data = collect(&dir, &["Hopper-v3".to_string()], &Algorithm::ALL, "").unwrap();

        assert!(data.runs.is_empty());
        assert_eq!(data.missing.len(), 3);
    }
}
