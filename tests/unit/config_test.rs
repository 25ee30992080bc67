//! Tests for configuration validation

use prometheus_task_scheduler::config::PoolConfig;

fn valid() -> PoolConfig {
    PoolConfig {
        min_workers: 2,
        max_workers: 10,
        task_timeout_ms: 30_000,
        retry_attempts: 3,
        worker_idle_timeout_ms: 300_000,
    }
}

#[test]
fn test_pool_config_validation() {
    assert!(valid().validate().is_ok());
    assert_eq!(valid(), PoolConfig::default());
}

#[test]
fn test_pool_config_invalid_max_workers() {
    let invalid = PoolConfig {
        max_workers: 0,
        min_workers: 0,
        ..valid()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_min_above_max() {
    let invalid = PoolConfig {
        min_workers: 4,
        max_workers: 2,
        ..valid()
    };
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("min_workers"));
}

#[test]
fn test_pool_config_invalid_timeout() {
    let invalid = PoolConfig {
        task_timeout_ms: 0,
        ..valid()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_retries_and_idle_timeout_are_allowed() {
    let cfg = PoolConfig {
        retry_attempts: 0,
        worker_idle_timeout_ms: 0,
        ..valid()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_pool_config_from_json() {
    let json = r#"{
        "min_workers": 1,
        "max_workers": 4,
        "task_timeout_ms": 5000,
        "retry_attempts": 2,
        "worker_idle_timeout_ms": 60000
    }"#;

    let config = PoolConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_workers, 4);
    assert_eq!(config.retry_attempts, 2);
}

#[test]
fn test_pool_config_from_partial_json_uses_defaults() {
    let config = PoolConfig::from_json_str(r#"{ "max_workers": 3 }"#).unwrap();
    assert_eq!(config.max_workers, 3);
    assert_eq!(config.min_workers, 2);
    assert_eq!(config.task_timeout_ms, 30_000);
}

#[test]
fn test_pool_config_from_json_rejects_invalid() {
    assert!(PoolConfig::from_json_str(r#"{ "max_workers": 0 }"#).is_err());
    assert!(PoolConfig::from_json_str("not json").is_err());
}
