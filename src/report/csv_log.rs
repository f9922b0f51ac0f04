//! Round log persistence
//!
//! One CSV file per (environment, algorithm) pair, named
//! `<env>~<algo>~<suffix>.csv`, with a fixed header row.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Algorithm, RoundRecord};
use crate::error::Result;

/// Round log file for an experiment
pub fn log_path<P: AsRef<Path>>(dir: P, env: &str, algorithm: Algorithm, suffix: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{}~{}~{}.csv", env, algorithm, suffix))
}

/// Write the whole round log, replacing any previous file
pub fn write_rounds<P: AsRef<Path>>(path: P, rounds: &[RoundRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if rounds.is_empty() {
        writer.write_record(crate::domain::ROUND_LOG_HEADER)?;
    }
    for round in rounds {
        writer.serialize(round)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a round log back, skipping the header row
pub fn read_rounds<P: AsRef<Path>>(path: P) -> Result<Vec<RoundRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rounds = Vec::new();
    for row in reader.deserialize() {
        rounds.push(row?);
    }
    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ROUND_LOG_HEADER;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rlcost-csv-{}", uuid::Uuid::new_v4()))
    }

    fn record(round_id: u32) -> RoundRecord {
        RoundRecord {
            round_id,
            duration: 12.5 + round_id as f64,
            episodes_this_iter: 3,
            learner_time: 4.0,
            actor_time: 6.0,
            eval_reward_max: 30.0,
            eval_reward_mean: 20.0 / 3.0,
            eval_reward_min: -10.0,
            learner_loss: 0.125,
            cost: 0.000_123_456_789,
        }
    }

    #[test]
    fn test_log_path_pattern() {
        let path = log_path("logs", "Hopper-v3", Algorithm::Ppo, "");
        assert_eq!(path, PathBuf::from("logs/Hopper-v3~ppo~.csv"));

        let path = log_path("logs", "Hopper-v3", Algorithm::Pg, "seed1");
        assert_eq!(path, PathBuf::from("logs/Hopper-v3~pg~seed1.csv"));
    }

    #[test]
    fn test_header_and_rows() {
        let dir = temp_dir();
        let path = log_path(&dir, "Walker2d-v3", Algorithm::Impala, "");
        write_rounds(&path, &[record(1), record(2)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ROUND_LOG_HEADER.join(","));
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let dir = temp_dir();
        let path = dir.join("round-trip.csv");
        let rounds: Vec<RoundRecord> = (1..=5).map(record).collect();

        write_rounds(&path, &rounds).unwrap();
        assert_eq!(read_rounds(&path).unwrap(), rounds);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_log_still_has_header() {
        let dir = temp_dir();
        let path = dir.join("empty.csv");

        write_rounds(&path, &[]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), ROUND_LOG_HEADER.join(","));
        assert!(read_rounds(&path).unwrap().is_empty());

        fs::remove_dir_all(&dir).ok();
    }
}
