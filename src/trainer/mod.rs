//! Training Framework Access
//!
//! Configuration assembly and the backends that build trainers from it.

pub mod backend;
pub mod config;
pub mod process;
pub mod replay;

pub use backend::{Trainer, TrainingBackend};
pub use config::{BatchMode, TrainerConfig};
pub use process::ProcessBackend;
pub use replay::ReplayBackend;

#[cfg(test)]
pub use backend::MockTrainer;

use crate::config::{BackendConfig, BackendKind};

/// Create the backend selected in configuration
pub fn backend_from_config(config: &BackendConfig) -> Box<dyn TrainingBackend> {
    match config.kind {
        BackendKind::Process => Box::new(ProcessBackend::from_config(config)),
        BackendKind::Replay => Box::new(ReplayBackend::new(&config.results_dir)),
    }
}
