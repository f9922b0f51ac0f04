//! Round Metrics Extraction
//!
//! Reads the nested result structure of one training iteration and turns it
//! into a [`RoundRecord`]. Field locations follow the framework's result
//! layout; learner time and loss depend on the algorithm.

use serde_json::Value;

use crate::config::AppConfig;
use crate::domain::{Algorithm, RewardSummary, RoundRecord, DEFAULT_POLICY_ID};
use crate::error::{Result, RlcostError};
use crate::pricing::CostModel;

use super::outliers::remove_outliers;

const IMPALA_LEARNER_TIMERS: [&str; 4] = [
    "learner_grad_time_ms",
    "learner_load_time_ms",
    "learner_load_wait_time_ms",
    "learner_dequeue_time_ms",
];

fn lookup<'a>(results: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = results;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(*key)
            .ok_or_else(|| RlcostError::missing(path[..=depth].join(".")))?;
    }
    Ok(current)
}

fn lookup_f64(results: &Value, path: &[&str]) -> Result<f64> {
    lookup(results, path)?
        .as_f64()
        .ok_or_else(|| RlcostError::invalid(path.join("."), "expected a number"))
}

fn ms_to_s(ms: f64) -> f64 {
    ms / 1000.0
}

/// Learner time of the round in seconds
pub fn learner_time(algorithm: Algorithm, results: &Value) -> Result<f64> {
    match algorithm {
        Algorithm::Impala => {
            let mut total_ms = 0.0;
            for timer in IMPALA_LEARNER_TIMERS {
                total_ms += lookup_f64(results, &["info", "timing_breakdown", timer])?;
            }
            Ok(ms_to_s(total_ms))
        }
        Algorithm::Pg | Algorithm::Ppo => {
            Ok(ms_to_s(lookup_f64(results, &["timers", "learn_time_ms"])?))
        }
    }
}

/// Rollout (actor) time of the round in seconds
pub fn actor_time(results: &Value) -> Result<f64> {
    Ok(ms_to_s(lookup_f64(results, &["timers", "sample_time_ms"])?))
}

/// Rewards of the evaluation episodes completed this round
pub fn episode_rewards(results: &Value) -> Result<Vec<f64>> {
    const PATH: [&str; 3] = ["evaluation", "hist_stats", "episode_reward"];

    let rewards = lookup(results, &PATH)?
        .as_array()
        .ok_or_else(|| RlcostError::invalid(PATH.join("."), "expected an array"))?;

    rewards
        .iter()
        .map(|reward| {
            reward
                .as_f64()
                .ok_or_else(|| RlcostError::invalid(PATH.join("."), "expected numeric rewards"))
        })
        .collect()
}

/// Learner loss of the default policy
///
/// Impala may finish a round without a gradient step, in which case the
/// default policy has no learner stats and the loss is reported as zero.
pub fn learner_loss(algorithm: Algorithm, results: &Value) -> Result<f64> {
    let stats_path = ["info", "learner", DEFAULT_POLICY_ID, "learner_stats", algorithm.loss_key()];

    match algorithm {
        Algorithm::Pg | Algorithm::Ppo => lookup_f64(results, &stats_path),
        Algorithm::Impala => {
            let policy_stats: Option<&Value> =
                lookup(results, &["info", "learner"])?.get(DEFAULT_POLICY_ID);
            match policy_stats {
                Some(_) => lookup_f64(results, &stats_path),
                None => Ok(0.0),
            }
        }
    }
}

fn episodes_this_iter(results: &Value) -> Result<u64> {
    lookup(results, &["episodes_this_iter"])?
        .as_u64()
        .ok_or_else(|| RlcostError::invalid("episodes_this_iter", "expected a non-negative integer"))
}

/// Turns raw training results into round records
#[derive(Debug, Clone)]
pub struct MetricsExtractor {
    cost_model: CostModel,
    /// IQR factor of the reward outlier filter, when enabled
    outlier_iqr_factor: Option<f64>,
}

impl MetricsExtractor {
    pub fn new(cost_model: CostModel) -> Self {
        Self {
            cost_model,
            outlier_iqr_factor: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let extractor = Self::new(CostModel::from_pricing(&config.pricing));
        if config.metrics.remove_reward_outliers {
            extractor.with_outlier_filter(config.metrics.outlier_iqr_factor)
        } else {
            extractor
        }
    }

    /// Drop reward outliers outside the Tukey fences before aggregating
    pub fn with_outlier_filter(mut self, iqr_factor: f64) -> Self {
        self.outlier_iqr_factor = Some(iqr_factor);
        self
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Extract a record, or `None` when the round id or the results are absent
    pub fn process(
        &self,
        algorithm: Algorithm,
        round_id: Option<u32>,
        results: Option<&Value>,
    ) -> Result<Option<RoundRecord>> {
        match (round_id, results) {
            (Some(round_id), Some(results)) => self.extract(algorithm, round_id, results).map(Some),
            _ => Ok(None),
        }
    }

    pub fn extract(&self, algorithm: Algorithm, round_id: u32, results: &Value) -> Result<RoundRecord> {
        let duration = lookup_f64(results, &["time_this_iter_s"])?;

        let mut rewards = episode_rewards(results)?;
        if let Some(factor) = self.outlier_iqr_factor {
            rewards = remove_outliers(&rewards, factor);
        }
        let reward = RewardSummary::from_rewards(&rewards);

        Ok(RoundRecord {
            round_id,
            duration,
            episodes_this_iter: episodes_this_iter(results)?,
            learner_time: learner_time(algorithm, results)?,
            actor_time: actor_time(results)?,
            eval_reward_max: reward.max,
            eval_reward_mean: reward.mean,
            eval_reward_min: reward.min,
            learner_loss: learner_loss(algorithm, results)?,
            cost: self.cost_model.round_cost(duration),
        })
    }
}
