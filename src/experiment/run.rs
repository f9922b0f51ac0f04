use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Algorithm, RoundRecord};
use crate::error::{Result, RlcostError};

/// Rounds recorded for one (algorithm, environment) experiment
#[derive(Debug, Clone)]
pub struct ExperimentRun {
    run_id: Uuid,
    algorithm: Algorithm,
    env: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    rounds: Vec<RoundRecord>,
}

impl ExperimentRun {
    pub fn new(algorithm: Algorithm, env: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            algorithm,
            env: env.into(),
            started_at: Utc::now(),
            finished_at: None,
            rounds: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Next round id expected by [`push`](Self::push)
    pub fn next_round_id(&self) -> u32 {
        self.rounds.len() as u32 + 1
    }

    /// Append a round; ids must be contiguous starting at 1
    pub fn push(&mut self, record: RoundRecord) -> Result<()> {
        if self.finished_at.is_some() {
            return Err(RlcostError::InvalidState(format!(
                "run {} already finished",
                self.run_id
            )));
        }

        let expected = self.next_round_id();
        if record.round_id != expected {
            return Err(RlcostError::InvalidState(format!(
                "expected round {} but got round {}",
                expected, record.round_id
            )));
        }

        self.rounds.push(record);
        Ok(())
    }

    pub fn finish(&mut self) {
        self.finished_at.get_or_insert_with(Utc::now);
    }

    /// Wall-clock seconds from creation to finish, once finished
    pub fn elapsed_s(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn total_cost(&self) -> f64 {
        self.rounds.iter().map(|round| round.cost).sum()
    }

    /// Summed training time reported by the framework, in seconds
    pub fn total_duration(&self) -> f64 {
        self.rounds.iter().map(|round| round.duration).sum()
    }
}
