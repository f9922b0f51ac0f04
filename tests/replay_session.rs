use rlcost::config::{AppConfig, BackendKind, EnvSpec};
use rlcost::domain::{Algorithm, ROUND_LOG_HEADER};
use rlcost::report::{collect, log_path, read_rounds};
use rlcost::{backend_from_config, ExperimentRunner};
use serde_json::json;
use std::path::{Path, PathBuf};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rlcost-{}-{}", tag, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn ppo_round(duration: f64, rewards: &[f64]) -> serde_json::Value {
    json!({
        "time_this_iter_s": duration,
        "episodes_this_iter": rewards.len(),
        "timers": { "learn_time_ms": 4000.0, "sample_time_ms": 6000.0 },
        "evaluation": { "hist_stats": { "episode_reward": rewards } },
        "info": { "learner": { "default_policy": { "learner_stats": { "total_loss": 0.25 } } } }
    })
}

fn write_results(dir: &Path, env: &str, algorithm: Algorithm, rounds: &[serde_json::Value]) {
    let lines: Vec<String> = rounds.iter().map(|r| r.to_string()).collect();
    std::fs::write(
        dir.join(format!("{}~{}.json", env, algorithm)),
        lines.join("\n") + "\n",
    )
    .unwrap();
}

fn replay_config(root: &Path, rounds: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.training.envs = vec![EnvSpec::new("Hopper-v3", 512), EnvSpec::new("Walker2d-v3", 256)];
    config.training.stop_max_round = rounds;
    config.backend.kind = BackendKind::Replay;
    config.backend.results_dir = root.join("results");
    config.report.logs_dir = root.join("logs");
    config
}

/// A replayed session writes one log line per round plus the header.
#[tokio::test]
async fn replay_session_writes_round_logs() {
    let root = temp_dir("session");
    let config = replay_config(&root, 3);
    std::fs::create_dir_all(&config.backend.results_dir).unwrap();

    let recorded: Vec<_> = (0..4).map(|i| ppo_round(12.5, &[10.0 + i as f64, 20.0, 30.0])).collect();
    write_results(&config.backend.results_dir, "Hopper-v3", Algorithm::Ppo, &recorded);

    let backend = backend_from_config(&config.backend);
    let runner = ExperimentRunner::new(&config, backend.as_ref());
    let envs = vec!["Hopper-v3".to_string()];
    let summary = runner.run_all(&[Algorithm::Ppo], &envs).await.unwrap();

    assert!(summary.is_success(), "failures: {:?}", summary.failed);
    let path = log_path(&config.report.logs_dir, "Hopper-v3", Algorithm::Ppo, "");
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], ROUND_LOG_HEADER.join(","));

    let rounds = read_rounds(&path).unwrap();
    let ids: Vec<u32> = rounds.iter().map(|r| r.round_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!((rounds[0].eval_reward_mean - 20.0).abs() < 1e-9);
    assert!((rounds[0].learner_time - 4.0).abs() < 1e-9);
    assert!((rounds[0].actor_time - 6.0).abs() < 1e-9);
    assert!((rounds[0].cost - 12.5 * runner_rate(&config)).abs() < 1e-12);

    std::fs::remove_dir_all(&root).ok();
}

fn runner_rate(config: &AppConfig) -> f64 {
    rlcost::CostModel::from_pricing(&config.pricing).rate_per_s()
}

/// A missing recording fails its experiment; the session keeps going.
#[tokio::test]
async fn replay_session_continues_after_missing_recording() {
    let root = temp_dir("partial");
    let config = replay_config(&root, 2);
    std::fs::create_dir_all(&config.backend.results_dir).unwrap();

    let recorded = vec![ppo_round(1.0, &[1.0]), ppo_round(1.0, &[2.0])];
    write_results(&config.backend.results_dir, "Walker2d-v3", Algorithm::Ppo, &recorded);

    let backend = backend_from_config(&config.backend);
    let runner = ExperimentRunner::new(&config, backend.as_ref());
    let envs = config.training.env_names();
    let summary = runner.run_all(&[Algorithm::Ppo], &envs).await.unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].env, "Hopper-v3");
    assert_eq!(summary.completed.len(), 1);

    let report = collect(&config.report.logs_dir, &envs, &[Algorithm::Ppo], "").unwrap();
    assert_eq!(report.runs.len(), 1);
    assert_eq!(report.runs[0].env, "Walker2d-v3");
    assert_eq!(report.missing.len(), 1);

    std::fs::remove_dir_all(&root).ok();
}

/// Running out of recorded rounds aborts the experiment without a log.
#[tokio::test]
async fn replay_exhaustion_leaves_no_log() {
    let root = temp_dir("short");
    let config = replay_config(&root, 5);
    std::fs::create_dir_all(&config.backend.results_dir).unwrap();
    write_results(&config.backend.results_dir, "Hopper-v3", Algorithm::Ppo, &[ppo_round(1.0, &[1.0])]);

    let backend = backend_from_config(&config.backend);
    let runner = ExperimentRunner::new(&config, backend.as_ref());
    let err = runner.run_experiment(Algorithm::Ppo, "Hopper-v3").await.unwrap_err();

    assert!(err.to_string().contains("exhausted after 1 rounds"), "got: {err}");
    assert!(!log_path(&config.report.logs_dir, "Hopper-v3", Algorithm::Ppo, "").exists());

    std::fs::remove_dir_all(&root).ok();
}

/// The replay backend refuses to start without its results directory.
#[tokio::test]
async fn replay_session_requires_results_dir() {
    let root = temp_dir("nodir");
    let config = replay_config(&root, 1);

    let backend = backend_from_config(&config.backend);
    let runner = ExperimentRunner::new(&config, backend.as_ref());
    let envs = vec!["Hopper-v3".to_string()];
    assert!(runner.run_all(&[Algorithm::Ppo], &envs).await.is_err());

    std::fs::remove_dir_all(&root).ok();
}
