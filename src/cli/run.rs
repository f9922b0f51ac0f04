//! `rlcost run`

use anyhow::{bail, Result};
use tracing::info;

use super::output::{print_items, OutputMode};
use crate::config::{AppConfig, BackendKind};
use crate::domain::Algorithm;
use crate::error::RlcostError;
use crate::experiment::ExperimentRunner;
use crate::trainer::backend_from_config;

/// Command line overrides of the session plan
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub algos: Vec<Algorithm>,
    pub envs: Vec<String>,
    pub rounds: Option<u32>,
    pub backend: Option<BackendKind>,
}

impl RunArgs {
    /// Fold the overrides into the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(rounds) = self.rounds {
            config.training.stop_max_round = rounds;
        }
        if let Some(kind) = self.backend {
            config.backend.kind = kind;
        }
        if !self.algos.is_empty() {
            config.training.algos = self.algos.clone();
        }
    }

    /// Environments to run, in order
    pub fn envs(&self, config: &AppConfig) -> Vec<String> {
        if self.envs.is_empty() {
            config.training.env_names()
        } else {
            self.envs.clone()
        }
    }
}

pub async fn run_session(mut config: AppConfig, args: RunArgs, mode: OutputMode) -> Result<()> {
    args.apply(&mut config);
    config.validate().map_err(RlcostError::InvalidConfig)?;

    let algos = config.training.algos.clone();
    let envs = args.envs(&config);
    let backend = backend_from_config(&config.backend);

    info!(
        backend = backend.name(),
        algos = ?algos,
        envs = ?envs,
        rounds = config.training.stop_max_round,
        "Starting session"
    );

    let runner = ExperimentRunner::new(&config, backend.as_ref());
    let summary = runner.run_all(&algos, &envs).await?;

    print_items(&summary.rows(), mode)?;

    if !summary.is_success() {
        bail!(
            "{} of {} experiments failed",
            summary.failed.len(),
            summary.failed.len() + summary.completed.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let mut config = AppConfig::default();
        let args = RunArgs {
            algos: vec![Algorithm::Pg],
            envs: Vec::new(),
            rounds: Some(2),
            backend: Some(BackendKind::Replay),
        };
        args.apply(&mut config);

        assert_eq!(config.training.algos, vec![Algorithm::Pg]);
        assert_eq!(config.training.stop_max_round, 2);
        assert_eq!(config.backend.kind, BackendKind::Replay);
        assert_eq!(args.envs(&config), config.training.env_names());
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = AppConfig::default();
        RunArgs::default().apply(&mut config);

        assert_eq!(config.training.algos, vec![Algorithm::Ppo]);
        assert_eq!(config.training.stop_max_round, 50);
        assert_eq!(config.backend.kind, BackendKind::Process);
    }

    #[test]
    fn test_env_override_keeps_order() {
        let args = RunArgs {
            envs: vec!["Walker2d-v3".to_string(), "Hopper-v3".to_string()],
            ..RunArgs::default()
        };
        assert_eq!(args.envs(&AppConfig::default()), vec!["Walker2d-v3", "Hopper-v3"]);
    }
}
