use rlcost::config::{AppConfig, BackendKind};
use rlcost::domain::Algorithm;

/// Values in `default.toml` override the built-in defaults; absent keys keep them.
#[test]
fn default_toml_overrides_builtin_defaults() {
    let dir = std::env::temp_dir().join(format!("rlcost-config-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("default.toml"),
        r#"
[training]
algos = ["impala", "pg"]
stop_max_round = 7

[[training.envs]]
name = "HalfCheetah-v3"
rollout_fragment_length = 128

[backend]
kind = "replay"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&dir).unwrap();

    assert_eq!(config.training.algos, vec![Algorithm::Impala, Algorithm::Pg]);
    assert_eq!(config.training.stop_max_round, 7);
    assert_eq!(config.training.env_names(), vec!["HalfCheetah-v3".to_string()]);
    assert_eq!(config.rollout_fragment_length("HalfCheetah-v3"), Some(128));
    assert_eq!(config.backend.kind, BackendKind::Replay);
    assert_eq!(config.cluster.num_rollout_workers, 16);
    assert!(config.validate().is_ok());

    std::fs::remove_dir_all(&dir).ok();
}

/// The bundled configuration file loads and validates.
#[test]
fn bundled_default_config_is_valid() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
    let config = AppConfig::load_from(dir).unwrap();

    assert_eq!(config.training.env_names().len(), 3);
    assert_eq!(config.training.algos, vec![Algorithm::Ppo]);
    assert!(config.validate().is_ok());
}
