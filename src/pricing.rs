//! Cloud cost model
//!
//! Converts node unit prices into per-second rates and prices a round by its
//! wall-clock duration.

use serde::Serialize;

use crate::config::{NodePricing, PricingConfig};

const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;
const HOURS_PER_MONTH: f64 = 30.0 * 24.0;

impl NodePricing {
    /// Hourly price of the node: VM + amortized floating IP + disk
    pub fn hourly_rate(&self) -> f64 {
        self.vm_per_hour + self.floating_ip_per_month / HOURS_PER_MONTH + self.disk_per_hour
    }

    pub fn per_second_rate(&self) -> f64 {
        self.hourly_rate() / SECONDS_PER_HOUR
    }
}

/// Per-second rates of the learner and actor nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostModel {
    pub learner_per_s: f64,
    pub actor_per_s: f64,
}

impl CostModel {
    pub fn new(learner_per_s: f64, actor_per_s: f64) -> Self {
        Self {
            learner_per_s,
            actor_per_s,
        }
    }

    pub fn from_pricing(pricing: &PricingConfig) -> Self {
        Self::new(
            pricing.learner.per_second_rate(),
            pricing.actor.per_second_rate(),
        )
    }

    /// Combined rate of all nodes billed for a round
    pub fn rate_per_s(&self) -> f64 {
        self.learner_per_s + self.actor_per_s
    }

    /// Cost of a round lasting `duration_s` seconds
    pub fn round_cost(&self, duration_s: f64) -> f64 {
        duration_s * self.rate_per_s()
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from_pricing(&PricingConfig::default())
    }
}
