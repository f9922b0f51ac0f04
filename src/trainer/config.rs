//! Trainer Configuration Assembly
//!
//! Builds the algorithm-specific configuration handed to the training
//! framework. Sections mirror the framework's builder calls.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::Algorithm;
use crate::error::{Result, RlcostError};

/// Complete configuration for building one trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub algorithm: Algorithm,
    pub framework: String,
    pub env: String,
    pub resources: ResourcesSection,
    pub rollouts: RolloutsSection,
    pub debugging: DebuggingSection,
    pub reporting: ReportingSection,
    pub experimental: ExperimentalSection,
    pub training: TrainingSection,
    pub evaluation: EvaluationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSection {
    /// GPUs of the driver process
    pub num_gpus: u32,
    pub num_cpus_for_local_worker: u32,
    pub num_cpus_per_worker: u32,
    pub num_gpus_per_worker: u32,
}

/// How rollout workers cut sample batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Cut at the fragment boundary even mid-episode
    TruncateEpisodes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutsSection {
    pub rollout_fragment_length: usize,
    pub num_rollout_workers: usize,
    pub num_envs_per_worker: usize,
    pub batch_mode: BatchMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebuggingSection {
    pub log_level: String,
    /// Result logger type; "noop" disables per-iteration result files
    pub logger: String,
    pub log_sys_usage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingSection {
    pub min_time_s_per_iteration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSection {
    pub enable_new_api_stack: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSection {
    pub train_batch_size: usize,
    /// Set for impala and ppo only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimate_batch_size: Option<usize>,
    /// Set for ppo only: one SGD mini-batch per round
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sgd_minibatch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSection {
    pub evaluation_interval: u32,
    pub evaluation_num_workers: usize,
    pub evaluation_duration: usize,
}

impl TrainerConfig {
    /// Assemble the trainer configuration for one (algorithm, environment) pair
    pub fn assemble(algorithm: Algorithm, env: &str, config: &AppConfig) -> Result<Self> {
        let fragment = config
            .rollout_fragment_length(env)
            .ok_or_else(|| RlcostError::UnknownEnvironment(env.to_string()))?;

        let cluster = &config.cluster;
        let per_worker_batch = cluster.num_envs_per_worker * fragment;
        let train_batch_size = cluster.num_rollout_workers * per_worker_batch;

        let estimate_batch_size = algorithm
            .uses_estimated_batch_size()
            .then_some(per_worker_batch);

        let sgd_minibatch_size = match algorithm {
            Algorithm::Ppo => Some(train_batch_size),
            Algorithm::Pg | Algorithm::Impala => None,
        };

        Ok(Self {
            algorithm,
            framework: config.training.framework.clone(),
            env: env.to_string(),
            resources: ResourcesSection {
                num_gpus: cluster.num_gpus_for_local_worker,
                num_cpus_for_local_worker: cluster.num_cpus_for_local_worker,
                num_cpus_per_worker: cluster.num_cpus_per_worker,
                num_gpus_per_worker: cluster.num_gpus_per_worker,
            },
            rollouts: RolloutsSection {
                rollout_fragment_length: fragment,
                num_rollout_workers: cluster.num_rollout_workers,
                num_envs_per_worker: cluster.num_envs_per_worker,
                batch_mode: BatchMode::TruncateEpisodes,
            },
            debugging: DebuggingSection {
                log_level: "ERROR".to_string(),
                logger: "noop".to_string(),
                log_sys_usage: false,
            },
            reporting: ReportingSection {
                min_time_s_per_iteration: cluster.min_time_s_per_iteration,
            },
            experimental: ExperimentalSection {
                enable_new_api_stack: cluster.enable_new_api_stack,
            },
            training: TrainingSection {
                train_batch_size,
                estimate_batch_size,
                sgd_minibatch_size,
            },
            evaluation: EvaluationSection {
                evaluation_interval: config.training.evaluation_interval,
                evaluation_num_workers: cluster.evaluation_num_workers,
                evaluation_duration: cluster.evaluation_num_workers,
            },
        })
    }
}
