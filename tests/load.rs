//! Integration tests for basic configuration loading.

#![allow(unsafe_code)] // For env var manipulation in tests

use liveconf::prelude::*;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct ServerConfig {
    host: String,
    port: u16,
}

#[derive(Debug, Deserialize, PartialEq)]
struct AppConfig {
    name: String,
    server: ServerConfig,
}

#[tokio::test]
async fn test_load_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.yaml");
    fs::write(
        &config_path,
        r#"
name: demo
server:
  host: localhost
  port: 8080
"#,
    )
    .unwrap();

    let loader = Loader::new();
    let config = loader.load(config_path.to_str().unwrap()).unwrap();

    let app: AppConfig = config.unmarshal().unwrap();
    assert_eq!(app.name, "demo");
    assert_eq!(app.server.host, "localhost");
    assert_eq!(app.server.port, 8080);
}

#[tokio::test]
async fn test_load_json_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.json");
    fs::write(
        &config_path,
        r#"{"name": "demo", "server": {"host": "localhost", "port": 9090}}"#,
    )
    .unwrap();

    let loader = Loader::new();
    let config = loader.load(config_path.to_str().unwrap()).unwrap();

    let app: AppConfig = config.unmarshal().unwrap();
    assert_eq!(app.server.port, 9090);
}

#[tokio::test]
async fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("missing.yaml");

    let loader = Loader::new();
    let result = loader.load(config_path.to_str().unwrap());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_invalid_document() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.json");
    fs::write(&config_path, "{not json").unwrap();

    let loader = Loader::new();
    let result = loader.load(config_path.to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Decode(_))));
}

#[tokio::test]
async fn test_explicit_codec_option() {
    let temp_dir = TempDir::new().unwrap();
    // YAML content behind an extension the inference knows nothing about.
    let config_path = temp_dir.path().join("app.conf");
    fs::write(&config_path, "name: demo").unwrap();
    let key = config_path.to_str().unwrap();

    let loader = Loader::new();

    // Forcing the json codec onto YAML content fails to decode.
    let result = loader.load_with(
        key,
        LoadOptions {
            codec: Some("json".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(ConfigError::Decode(_))));

    let config = loader
        .load_with(
            key,
            LoadOptions {
                codec: Some("yaml".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(config.document()["name"], "demo");
}

#[tokio::test]
async fn test_expand_env_option() {
    unsafe {
        std::env::set_var("LIVECONF_IT_DB_HOST", "db.internal");
    }

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.yaml");
    fs::write(
        &config_path,
        "name: demo\nserver:\n  host: ${LIVECONF_IT_DB_HOST}\n  port: 5432\n",
    )
    .unwrap();

    let loader = Loader::new();
    let config = loader
        .load_with(
            config_path.to_str().unwrap(),
            LoadOptions {
                expand_env: true,
                ..Default::default()
            },
        )
        .unwrap();

    let app: AppConfig = config.unmarshal().unwrap();
    assert_eq!(app.server.host, "db.internal");
}

#[tokio::test]
async fn test_reload_picks_up_new_content() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.yaml");
    fs::write(&config_path, "name: hello").unwrap();

    let loader = Loader::new();
    let config = loader.load(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.bytes(), b"name: hello");

    fs::write(&config_path, "name: hello-1").unwrap();
    config.reload().unwrap();
    assert_eq!(config.bytes(), b"name: hello-1");
}

#[tokio::test]
async fn test_default_loader_convenience() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.yaml");
    fs::write(&config_path, "name: hello").unwrap();

    let config = liveconf::load(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.document()["name"], "hello");
}
