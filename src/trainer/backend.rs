use async_trait::async_trait;
use serde_json::Value;

use super::config::TrainerConfig;
use crate::error::Result;

/// A built trainer owned by one experiment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Trainer: Send {
    /// Run one training iteration and return the framework's raw result
    async fn train(&mut self) -> Result<Value>;

    /// Release the trainer and its workers
    async fn stop(&mut self) -> Result<()>;
}

/// Adapter to the external training framework
#[async_trait]
pub trait TrainingBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Bring up the framework runtime; called once per session
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Build a trainer from an assembled configuration
    async fn build(&self, config: &TrainerConfig) -> Result<Box<dyn Trainer>>;

    /// Tear down the framework runtime; called once per session
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
