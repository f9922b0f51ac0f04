use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::Algorithm;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub cluster: ClusterConfig,
    pub training: TrainingConfig,
    pub pricing: PricingConfig,
    pub metrics: MetricsConfig,
    pub report: ReportConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

/// Resource allocation handed to the training framework
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Rollout workers collecting samples
    pub num_rollout_workers: usize,
    /// Vectorized environments per rollout worker
    pub num_envs_per_worker: usize,
    /// CPUs reserved for the driver (local) worker
    pub num_cpus_for_local_worker: u32,
    /// GPUs reserved for the driver (local) worker
    pub num_gpus_for_local_worker: u32,
    pub num_cpus_per_worker: u32,
    pub num_gpus_per_worker: u32,
    /// Workers dedicated to evaluation episodes
    pub evaluation_num_workers: usize,
    /// Minimum reporting interval per training iteration, if any
    pub min_time_s_per_iteration: Option<f64>,
    pub enable_new_api_stack: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            num_rollout_workers: 16,
            num_envs_per_worker: 4,
            num_cpus_for_local_worker: 2,
            num_gpus_for_local_worker: 1,
            num_cpus_per_worker: 1,
            num_gpus_per_worker: 0,
            evaluation_num_workers: 6,
            min_time_s_per_iteration: None,
            enable_new_api_stack: false,
        }
    }
}

/// One simulation environment and its rollout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSpec {
    /// Environment id as registered with the framework (e.g. "Hopper-v3")
    pub name: String,
    /// Environment steps collected per worker before a batch boundary
    pub rollout_fragment_length: usize,
}

impl EnvSpec {
    pub fn new(name: impl Into<String>, rollout_fragment_length: usize) -> Self {
        Self {
            name: name.into(),
            rollout_fragment_length,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Deep-learning framework the trainer runs on
    pub framework: String,
    pub envs: Vec<EnvSpec>,
    pub algos: Vec<Algorithm>,
    /// Number of training rounds per experiment
    pub stop_max_round: u32,
    /// Evaluate every N training rounds
    pub evaluation_interval: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            framework: "torch".to_string(),
            envs: vec![
                EnvSpec::new("Hopper-v3", 512),
                EnvSpec::new("Humanoid-v3", 512),
                EnvSpec::new("Walker2d-v3", 512),
            ],
            algos: vec![Algorithm::Ppo],
            stop_max_round: 50,
            evaluation_interval: 1,
        }
    }
}

impl TrainingConfig {
    /// Look up an environment by name
    pub fn env(&self, name: &str) -> Option<&EnvSpec> {
        self.envs.iter().find(|env| env.name == name)
    }

    pub fn env_names(&self) -> Vec<String> {
        self.envs.iter().map(|env| env.name.clone()).collect()
    }
}

/// Unit prices of one cloud node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePricing {
    /// Virtual machine price per hour
    pub vm_per_hour: f64,
    /// Floating IP price per month (amortized over 30 days)
    pub floating_ip_per_month: f64,
    /// Disk price per hour
    #[serde(default)]
    pub disk_per_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub learner: NodePricing,
    pub actor: NodePricing,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            learner: NodePricing {
                vm_per_hour: 3.06,
                floating_ip_per_month: 17.92,
                disk_per_hour: 0.0,
            },
            actor: NodePricing {
                vm_per_hour: 0.68,
                floating_ip_per_month: 17.92,
                disk_per_hour: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Drop evaluation rewards outside the Tukey fences before aggregating
    pub remove_reward_outliers: bool,
    /// Fence width as a multiple of the interquartile range
    pub outlier_iqr_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            remove_reward_outliers: false,
            outlier_iqr_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory round logs are written to and read from
    pub logs_dir: PathBuf,
    /// Directory charts are rendered into
    pub imgs_dir: PathBuf,
    /// Optional trailing component of round log file names
    pub csv_suffix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            imgs_dir: PathBuf::from("imgs"),
            csv_suffix: String::new(),
        }
    }
}

/// Which adapter talks to the training framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Spawn a worker process per experiment and speak JSON lines over stdio
    Process,
    /// Re-drive experiments from recorded result logs
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Worker program for the process backend
    pub command: String,
    pub args: Vec<String>,
    /// Seconds the worker gets to exit after `shutdown` before it is killed
    pub stop_timeout_s: f64,
    /// Recorded result logs for the replay backend
    pub results_dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Process,
            command: "python3".to_string(),
            args: vec!["rlcost_worker.py".to_string()],
            stop_timeout_s: 30.0,
            results_dir: PathBuf::from("results"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON formatted logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/cluster.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("RLCOST_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (RLCOST_TRAINING__STOP_MAX_ROUND, etc.)
            .add_source(
                Environment::with_prefix("RLCOST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("training.algos")
                    .with_list_parse_key("backend.args")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Rollout fragment length configured for an environment
    pub fn rollout_fragment_length(&self, env: &str) -> Option<usize> {
        self.training.env(env).map(|spec| spec.rollout_fragment_length)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.cluster.num_rollout_workers == 0 {
            errors.push("cluster.num_rollout_workers must be positive".to_string());
        }

        if self.cluster.num_envs_per_worker == 0 {
            errors.push("cluster.num_envs_per_worker must be positive".to_string());
        }

        if let Some(min_time) = self.cluster.min_time_s_per_iteration {
            if min_time < 0.0 {
                errors.push("cluster.min_time_s_per_iteration must not be negative".to_string());
            }
        }

        if self.training.envs.is_empty() {
            errors.push("training.envs must not be empty".to_string());
        }

        for env in &self.training.envs {
            if env.rollout_fragment_length == 0 {
                errors.push(format!(
                    "rollout_fragment_length of {} must be positive",
                    env.name
                ));
            }
            if env.name.contains('~') {
                errors.push(format!("environment name {} must not contain '~'", env.name));
            }
        }

        let mut names = self.training.env_names();
        names.sort();
        names.dedup();
        if names.len() != self.training.envs.len() {
            errors.push("training.envs contains duplicate names".to_string());
        }

        if self.training.algos.is_empty() {
            errors.push("training.algos must not be empty".to_string());
        }

        if self.training.stop_max_round == 0 {
            errors.push("training.stop_max_round must be positive".to_string());
        }

        for (role, node) in [("learner", &self.pricing.learner), ("actor", &self.pricing.actor)] {
            if node.vm_per_hour < 0.0 || node.floating_ip_per_month < 0.0 || node.disk_per_hour < 0.0
            {
                errors.push(format!("pricing.{role} prices must not be negative"));
            }
        }

        if self.metrics.outlier_iqr_factor <= 0.0 {
            errors.push("metrics.outlier_iqr_factor must be positive".to_string());
        }

        if self.backend.kind == BackendKind::Process && self.backend.command.trim().is_empty() {
            errors.push("backend.command is required for the process backend".to_string());
        }

        if !(self.backend.stop_timeout_s > 0.0 && self.backend.stop_timeout_s.is_finite()) {
            errors.push("backend.stop_timeout_s must be a positive number of seconds".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
