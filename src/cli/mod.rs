//! rlcost CLI
//!
//! Commands:
//! - `rlcost run` - Train every configured (algorithm, environment) pair
//! - `rlcost plot` - Render charts and the cost table from round logs
//! - `rlcost extract` - Turn one raw results payload into a round record
//! - `rlcost config` - Show, validate and inspect configuration

pub mod config;
pub mod output;
pub mod report;
pub mod run;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, BackendKind};
use crate::domain::Algorithm;
use output::OutputMode;

/// RL training cost driver
#[derive(Parser, Debug)]
#[command(name = "rlcost")]
#[command(author, version, about = "Run RL training rounds and report per-round metrics and cloud cost")]
pub struct Cli {
    /// Configuration directory (default.toml plus the RLCOST_ENV overlay)
    #[arg(long, global = true, default_value = "config", env = "RLCOST_CONFIG_DIR")]
    pub config: PathBuf,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train every (algorithm, environment) pair and write round logs
    Run {
        /// Algorithms to run (repeatable; defaults to training.algos)
        #[arg(long = "algo", value_enum)]
        algos: Vec<Algorithm>,
        /// Environments to run (repeatable; defaults to training.envs)
        #[arg(long = "env")]
        envs: Vec<String>,
        /// Rounds per experiment (overrides training.stop_max_round)
        #[arg(long)]
        rounds: Option<u32>,
        /// Training backend (overrides backend.kind)
        #[arg(long, value_enum)]
        backend: Option<BackendKind>,
    },

    /// Render charts and print total costs from existing round logs
    Plot {
        /// Directory holding round logs (overrides report.logs_dir)
        #[arg(long)]
        logs: Option<PathBuf>,
        /// Output directory for charts (overrides report.imgs_dir)
        #[arg(long)]
        imgs: Option<PathBuf>,
    },

    /// Extract a round record from a raw results payload
    Extract {
        #[arg(long, value_enum)]
        algo: Algorithm,
        /// JSON object, or JSON lines with one payload per round
        #[arg(long)]
        input: PathBuf,
        /// Round to extract (1-based line of a JSON lines input)
        #[arg(long, default_value = "1")]
        round: u32,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

impl Commands {
    /// Whether the command trains and should log to file
    pub fn is_long_running(&self) -> bool {
        matches!(self, Commands::Run { .. })
    }
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_json_flag(self.json)
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load_from(&self.config)
            .with_context(|| format!("Failed to load configuration from {}", self.config.display()))
    }

    /// Dispatch the parsed command
    pub async fn run(self, config: AppConfig) -> Result<()> {
        let mode = self.output_mode();

        match self.command {
            Commands::Run {
                algos,
                envs,
                rounds,
                backend,
            } => {
                let args = run::RunArgs {
                    algos,
                    envs,
                    rounds,
                    backend,
                };
                run::run_session(config, args, mode).await
            }
            Commands::Plot { logs, imgs } => report::plot(&config, logs, imgs, mode),
            Commands::Extract { algo, input, round } => {
                report::extract(&config, algo, &input, round, mode).await
            }
            Commands::Config(cmd) => cmd.run(&config, mode),
        }
    }
}
