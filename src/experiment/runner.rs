//! Round Driver
//!
//! Builds one trainer per (algorithm, environment) pair, drives it for a
//! fixed number of rounds and persists the round log. Experiments run
//! strictly one after another.

use serde::Serialize;
use tabled::Tabled;
use tracing::{error, info, warn};

use super::run::ExperimentRun;
use crate::config::AppConfig;
use crate::domain::{Algorithm, RoundRecord};
use crate::error::{Result, RlcostError};
use crate::metrics::MetricsExtractor;
use crate::report::csv_log::{log_path, write_rounds};
use crate::trainer::{Trainer, TrainerConfig, TrainingBackend};

/// An experiment that aborted
#[derive(Debug)]
pub struct ExperimentFailure {
    pub algorithm: Algorithm,
    pub env: String,
    pub error: RlcostError,
}

/// Outcome of a whole session
#[derive(Debug, Default)]
pub struct SessionSummary {
    pub completed: Vec<ExperimentRun>,
    pub failed: Vec<ExperimentFailure>,
}

impl SessionSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn rows(&self) -> Vec<SessionRow> {
        let completed = self.completed.iter().map(|run| SessionRow {
            algorithm: run.algorithm().to_string(),
            env: run.env().to_string(),
            rounds: run.rounds().len(),
            total_cost: format!("${:.4}", run.total_cost()),
            status: "ok".to_string(),
        });
        let failed = self.failed.iter().map(|failure| SessionRow {
            algorithm: failure.algorithm.to_string(),
            env: failure.env.clone(),
            rounds: 0,
            total_cost: "-".to_string(),
            status: failure.error.to_string(),
        });
        completed.chain(failed).collect()
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SessionRow {
    pub algorithm: String,
    pub env: String,
    pub rounds: usize,
    pub total_cost: String,
    pub status: String,
}

fn print_round(algorithm: Algorithm, env: &str, record: &RoundRecord) {
    println!();
    println!("******************");
    println!("Running algo {}, env {}", algorithm, env);
    println!("round_id: {}", record.round_id);
    println!("duration: {}", record.duration);
    println!("eval_reward_mean: {}", record.eval_reward_mean);
    println!("cost: {}", record.cost);
}

/// Drives experiments against a training backend
pub struct ExperimentRunner<'a> {
    config: &'a AppConfig,
    backend: &'a dyn TrainingBackend,
    extractor: MetricsExtractor,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(config: &'a AppConfig, backend: &'a dyn TrainingBackend) -> Self {
        Self {
            config,
            backend,
            extractor: MetricsExtractor::from_config(config),
        }
    }

    /// Run one experiment to completion and write its round log
    ///
    /// The trainer is stopped whether or not the rounds succeed.
    pub async fn run_experiment(&self, algorithm: Algorithm, env: &str) -> Result<ExperimentRun> {
        let trainer_config = TrainerConfig::assemble(algorithm, env, self.config)?;
        let mut run = ExperimentRun::new(algorithm, env);

        info!(
            run_id = %run.run_id(),
            algo = %algorithm,
            env,
            backend = self.backend.name(),
            train_batch_size = trainer_config.training.train_batch_size,
            cost_per_s = self.extractor.cost_model().rate_per_s(),
            "Starting experiment"
        );

        let mut trainer = self.backend.build(&trainer_config).await?;

        let outcome = match self.drive_rounds(trainer.as_mut(), &mut run).await {
            Ok(()) => self.export(&mut run),
            Err(e) => Err(e),
        };
        let stopped = trainer.stop().await;

        match (outcome, stopped) {
            (Ok(()), Ok(())) => {
                info!(
                    run_id = %run.run_id(),
                    rounds = run.rounds().len(),
                    total_cost = run.total_cost(),
                    elapsed_s = run.elapsed_s().unwrap_or_default(),
                    "Experiment complete"
                );
                Ok(run)
            }
            (Ok(()), Err(stop_err)) => Err(stop_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(stop_err)) => {
                warn!(run_id = %run.run_id(), "Trainer stop also failed: {}", stop_err);
                Err(e)
            }
        }
    }

    async fn drive_rounds(&self, trainer: &mut dyn Trainer, run: &mut ExperimentRun) -> Result<()> {
        let stop_max_round = self.config.training.stop_max_round;

        for round_id in 1..=stop_max_round {
            let results = trainer.train().await?;
            let record = self.extractor.extract(run.algorithm(), round_id, &results)?;

            print_round(run.algorithm(), run.env(), &record);
            info!(
                run_id = %run.run_id(),
                round_id,
                duration = record.duration,
                eval_reward_mean = record.eval_reward_mean,
                cost = record.cost,
                "Round complete"
            );

            run.push(record)?;
        }

        Ok(())
    }

    fn export(&self, run: &mut ExperimentRun) -> Result<()> {
        run.finish();
        let path = log_path(
            &self.config.report.logs_dir,
            run.env(),
            run.algorithm(),
            &self.config.report.csv_suffix,
        );
        write_rounds(&path, run.rounds())?;
        info!("Round log written to {}", path.display());
        Ok(())
    }

    /// Run every (algorithm, environment) pair in order
    ///
    /// The backend runtime is brought up once for the session. A failed
    /// experiment is recorded and the session moves on to the next pair.
    pub async fn run_all(&self, algorithms: &[Algorithm], envs: &[String]) -> Result<SessionSummary> {
        self.backend.init().await?;
        let mut summary = SessionSummary::default();

        for &algorithm in algorithms {
            for env in envs {
                match self.run_experiment(algorithm, env).await {
                    Ok(run) => summary.completed.push(run),
                    Err(e) => {
                        error!(algo = %algorithm, env = %env, "Experiment failed: {}", e);
                        summary.failed.push(ExperimentFailure {
                            algorithm,
                            env: env.clone(),
                            error: e,
                        });
                    }
                }
            }
        }

        self.backend.shutdown().await?;
        Ok(summary)
    }
}
