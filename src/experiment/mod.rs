//! Experiment Execution
//!
//! An experiment is one (algorithm, environment) pair trained for a fixed
//! number of rounds; a session runs the configured cross product.

pub mod run;
pub mod runner;

pub use run::ExperimentRun;
pub use runner::{ExperimentFailure, ExperimentRunner, SessionRow, SessionSummary};
