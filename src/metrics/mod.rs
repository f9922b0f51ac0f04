//! Round metrics extraction from raw training results

pub mod extractor;
pub mod outliers;

pub use extractor::{actor_time, episode_rewards, learner_loss, learner_time, MetricsExtractor};
pub use outliers::remove_outliers;
