use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Column names of a persisted round log, in file order
pub const ROUND_LOG_HEADER: [&str; 10] = [
    "round_id",
    "duration",
    "episodes_this_iter",
    "learner_time",
    "actor_time",
    "eval_reward_max",
    "eval_reward_mean",
    "eval_reward_min",
    "learner_loss",
    "cost",
];

/// Metrics of one completed training round
///
/// Field order matches [`ROUND_LOG_HEADER`]; the CSV writer derives the
/// header from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct RoundRecord {
    /// 1-based round number
    pub round_id: u32,
    /// Wall-clock duration of the round in seconds
    pub duration: f64,
    pub episodes_this_iter: u64,
    /// Learner time in seconds
    pub learner_time: f64,
    /// Rollout (actor) time in seconds
    pub actor_time: f64,
    pub eval_reward_max: f64,
    pub eval_reward_mean: f64,
    pub eval_reward_min: f64,
    pub learner_loss: f64,
    /// Estimated cloud cost of the round in dollars
    pub cost: f64,
}

/// Max/mean/min of the evaluation episode rewards of one round
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RewardSummary {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

impl RewardSummary {
    /// Summarize episode rewards; an empty slice summarizes to all zeros
    pub fn from_rewards(rewards: &[f64]) -> Self {
        if rewards.is_empty() {
            return Self::default();
        }

        let max = rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = rewards.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = rewards.iter().sum::<f64>() / rewards.len() as f64;

        Self { max, mean, min }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rewards_summarize_to_zero() {
        let summary = RewardSummary::from_rewards(&[]);
        assert_eq!(summary, RewardSummary { max: 0.0, mean: 0.0, min: 0.0 });
    }

    #[test]
    fn test_reward_summary() {
        let summary = RewardSummary::from_rewards(&[10.0, 20.0, 30.0]);
        assert!((summary.max - 30.0).abs() < 1e-9);
        assert!((summary.mean - 20.0).abs() < 1e-9);
        assert!((summary.min - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_rewards() {
        let summary = RewardSummary::from_rewards(&[-5.0, -1.0]);
        assert_eq!(summary.max, -1.0);
        assert_eq!(summary.min, -5.0);
        assert_eq!(summary.mean, -3.0);
    }
}
