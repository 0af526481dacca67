//! Configuration loading from files and the environment.

mod support;

use std::path::PathBuf;
use std::time::Duration;

use farmmind_lite::backend::{ApiError, BackendFactory, BackendType, CatalogBackend};
use farmmind_lite::config::{ClientConfig, ENV_API_URL, ENV_BACKEND, ENV_STORAGE_DIR};
use support::with_scoped_env;

const SAMPLE: &str = r#"
[backend]
type = "http"

[api]
base_url = "http://farm.example:8080"
timeout_secs = 10

[storage]
dir = "/var/lib/farmmind"

[estimator.cost_per_ha]
seeds = 55.0
fertilizer = 130.0
labor = 210.0

[weather]
default_location = "Andijan"
"#;

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farmmind.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

fn clean_env() -> [(&'static str, Option<&'static str>); 3] {
    [(ENV_BACKEND, None), (ENV_API_URL, None), (ENV_STORAGE_DIR, None)]
}

#[test]
fn test_load_full_file() {
    let (_dir, path) = write_config(SAMPLE);
    let config = with_scoped_env(&clean_env(), || ClientConfig::load(Some(&path))).unwrap();

    assert_eq!(config.backend_type().unwrap(), BackendType::Http);
    assert_eq!(config.api.base_url, "http://farm.example:8080");
    assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    assert_eq!(config.storage.dir, PathBuf::from("/var/lib/farmmind"));
    assert_eq!(config.estimator.cost_per_ha.labor, 210.0);
    assert_eq!(config.weather.default_location, "Andijan");
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, path) = write_config(SAMPLE);
    let config = with_scoped_env(
        &[
            (ENV_BACKEND, Some("local")),
            (ENV_API_URL, Some("http://127.0.0.1:9999")),
            (ENV_STORAGE_DIR, Some("/tmp/farmmind-test")),
        ],
        || ClientConfig::load(Some(&path)),
    )
    .unwrap();

    assert_eq!(config.backend_type().unwrap(), BackendType::Local);
    assert_eq!(config.api.base_url, "http://127.0.0.1:9999");
    assert_eq!(config.storage.dir, PathBuf::from("/tmp/farmmind-test"));
}

#[test]
fn test_backend_type_from_env_defaults_to_http() {
    with_scoped_env(&[(ENV_BACKEND, Some("memory"))], || {
        assert_eq!(BackendType::from_env(), BackendType::Local);
    });
    with_scoped_env(&[(ENV_BACKEND, Some("pigeon"))], || {
        assert_eq!(BackendType::from_env(), BackendType::Http);
    });
    with_scoped_env(&[(ENV_BACKEND, None)], || {
        assert_eq!(BackendType::from_env(), BackendType::Http);
    });
}

#[test]
fn test_missing_and_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = ClientConfig::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, ApiError::Configuration { .. }));

    let (_dir, path) = write_config("[backend]\ntype = \"carrier-pigeon\"\n");
    let err = with_scoped_env(&clean_env(), || ClientConfig::load(Some(&path))).unwrap_err();
    assert!(err.user_message().contains("Invalid backend type"));

    let (_dir, path) = write_config("[estimator.cost_per_ha]\nseeds = -5.0\n");
    let err = with_scoped_env(&clean_env(), || ClientConfig::load(Some(&path))).unwrap_err();
    assert!(err.user_message().contains("estimator.cost_per_ha.seeds"));
}

#[tokio::test]
async fn test_factory_builds_local_backend_from_config() {
    let config = ClientConfig::parse("[backend]\ntype = \"local\"\n").unwrap();
    let backend = BackendFactory::create(&config).unwrap();
    assert!(backend.health_check().await.unwrap());
    assert_eq!(backend.list_crops().await.unwrap().len(), 8);
}
