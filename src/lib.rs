pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod pricing;
pub mod report;
pub mod trainer;

pub use config::AppConfig;
pub use domain::{Algorithm, RoundRecord};
pub use error::{Result, RlcostError};
pub use experiment::{ExperimentRun, ExperimentRunner, SessionSummary};
pub use metrics::MetricsExtractor;
pub use pricing::CostModel;
pub use trainer::{backend_from_config, Trainer, TrainerConfig, TrainingBackend};
