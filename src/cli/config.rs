//! Configuration management commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::{print_item, OutputMode};
use crate::config::AppConfig;
use crate::domain::Algorithm;
use crate::trainer::TrainerConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Validate the effective configuration
    Validate,

    /// Show the trainer configuration assembled for one experiment
    Trainer {
        #[arg(long, value_enum)]
        algo: Algorithm,
        #[arg(long)]
        env: String,
    },
}

impl ConfigCommands {
    pub fn run(self, config: &AppConfig, mode: OutputMode) -> Result<()> {
        match self {
            Self::Show => show_config(config, mode),
            Self::Validate => validate_config(config),
            Self::Trainer { algo, env } => {
                let trainer_config = TrainerConfig::assemble(algo, &env, config)?;
                print_item(&trainer_config)
            }
        }
    }
}

fn show_config(config: &AppConfig, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Table => {
            let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
        OutputMode::Json => print_item(config),
    }
}

fn validate_config(config: &AppConfig) -> Result<()> {
    println!("\n  Validating configuration...\n");

    match config.validate() {
        Ok(()) => {
            println!("  \x1b[32m✓ Configuration valid\x1b[0m\n");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                println!("  \x1b[31m✗ {}\x1b[0m", error);
            }
            println!();
            anyhow::bail!("{} configuration error(s)", errors.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(rendered.contains("[cluster]"));
        assert!(rendered.contains("stop_max_round = 50"));
    }

    #[test]
    fn test_validate_reports_errors() {
        let mut config = AppConfig::default();
        config.training.stop_max_round = 0;
        assert!(validate_config(&config).is_err());
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_trainer_for_unknown_env_fails() {
        let cmd = ConfigCommands::Trainer {
            algo: Algorithm::Ppo,
            env: "Pong-v5".to_string(),
        };
        assert!(cmd.run(&AppConfig::default(), OutputMode::Json).is_err());
    }
}
