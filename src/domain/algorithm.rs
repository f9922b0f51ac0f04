use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RlcostError;

/// Policy identifier the framework uses when a single policy is trained
pub const DEFAULT_POLICY_ID: &str = "default_policy";

/// Training algorithm driven by an experiment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Vanilla policy gradient
    Pg,
    /// Importance-weighted actor-learner architecture
    Impala,
    /// Proximal policy optimization
    Ppo,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Impala, Algorithm::Pg, Algorithm::Ppo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Pg => "pg",
            Algorithm::Impala => "impala",
            Algorithm::Ppo => "ppo",
        }
    }

    /// Whether the trainer config carries an estimated per-worker batch size
    pub fn uses_estimated_batch_size(&self) -> bool {
        match self {
            Algorithm::Pg => false,
            Algorithm::Impala | Algorithm::Ppo => true,
        }
    }

    /// Name of the learner-stats scalar reported as the round's loss
    pub fn loss_key(&self) -> &'static str {
        match self {
            Algorithm::Pg => "policy_loss",
            Algorithm::Impala | Algorithm::Ppo => "total_loss",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = RlcostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pg" => Ok(Algorithm::Pg),
            "impala" => Ok(Algorithm::Impala),
            "ppo" => Ok(Algorithm::Ppo),
            other => Err(RlcostError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.to_string().parse::<Algorithm>().unwrap(), algo);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "dqn".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, RlcostError::UnknownAlgorithm(ref name) if name == "dqn"));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Algorithm::Impala).unwrap();
        assert_eq!(json, "\"impala\"");
        let algo: Algorithm = serde_json::from_str("\"ppo\"").unwrap();
        assert_eq!(algo, Algorithm::Ppo);
    }

    #[test]
    fn test_loss_key() {
        assert_eq!(Algorithm::Pg.loss_key(), "policy_loss");
        assert_eq!(Algorithm::Ppo.loss_key(), "total_loss");
        assert_eq!(Algorithm::Impala.loss_key(), "total_loss");
    }
}
