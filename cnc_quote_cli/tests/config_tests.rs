//! Tests for layered configuration and the `config` key store
//!
//! Every test points a ConfigManager at its own temporary file so nothing
//! touches the user's configuration.

use cnc_quote_cli::config::{AppConfig, ConfigManager};
use cnc_quote_cli::error::{CliError, ExitCode};
use std::fs;
use tempfile::TempDir;

fn create_test_config_manager(temp_dir: &TempDir) -> ConfigManager {
    ConfigManager::with_path(temp_dir.path().join("config.toml"))
}

#[test]
fn test_defaults_when_file_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config_manager(&temp_dir).load().unwrap();

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.pipeline.limits.max_files, 10);
    assert_eq!(config.pipeline.time_unit_micros, 1000);
    assert_eq!(config.output.default_format, "text");
}

#[test]
fn test_set_then_get_limit() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    manager.set("pipeline.limits.max_files", "3").unwrap();

    assert_eq!(manager.get("pipeline.limits.max_files").unwrap(), "3");
    assert_eq!(manager.load().unwrap().pipeline.limits.max_files, 3);
}

#[test]
fn test_set_preserves_existing_values() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    manager.set("pipeline.seed", "42").unwrap();
    manager.set("output.default_format", "json").unwrap();
    manager.set("pipeline.pricing.market_multiplier", "2.5").unwrap();

    let config = manager.load().unwrap();
    assert_eq!(config.pipeline.seed, Some(42));
    assert_eq!(config.output.default_format, "json");
    assert_eq!(config.pipeline.pricing.market_multiplier, 2.5);
    // Untouched pricing keys keep their defaults
    assert_eq!(config.pipeline.pricing.quality_control_rate, 0.1);
}

#[test]
fn test_overwrites_existing_value() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    manager.set("pipeline.error_delimiter", " | ").unwrap();
    manager.set("pipeline.error_delimiter", " / ").unwrap();

    assert_eq!(manager.get("pipeline.error_delimiter").unwrap(), " / ");
}

#[test]
fn test_creates_config_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("cncquote").join("config.toml");
    let mut manager = ConfigManager::with_path(config_path.clone());

    assert!(!config_path.parent().unwrap().exists());
    manager.set("output.progress_enabled", "false").unwrap();

    assert!(config_path.exists());
}

#[test]
fn test_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    assert!(manager.set("pipeline.limits.max_files", "0").is_err());
    assert!(manager.set("pipeline.limits.max_files", "many").is_err());
    assert!(manager.set("pipeline.pricing.shipping_rate", "-1").is_err());
    assert!(manager.set("output.color_enabled", "yes").is_err());
    assert!(manager.set("output.default_format", "xml").is_err());

    // Nothing was written
    assert!(!manager.config_path().exists());
}

#[test]
fn test_unknown_key_is_misuse() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    let err = manager.set("pipeline.limit.max_files", "3").unwrap_err();
    let cli = CliError::from(err);

    assert_eq!(cli.exit_code(), ExitCode::Misuse);
    assert_eq!(
        cli.suggestions[0],
        "Did you mean 'pipeline.limits.max_files'?"
    );
}

#[test]
fn test_get_missing_or_complex_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    let manager = create_test_config_manager(&temp_dir);

    assert!(manager.get("pipeline.nothing").is_err());
    // Tables and arrays are not scalar values
    assert!(manager.get("pipeline.limits").is_err());
    assert!(manager.get("pipeline.limits.allowed_extensions").is_err());
}

#[test]
fn test_list_contains_scalars_only() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);
    manager.set("pipeline.time_unit_micros", "0").unwrap();

    let items = manager.list().unwrap();

    let lookup = |key: &str| {
        items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(lookup("pipeline.time_unit_micros").as_deref(), Some("0"));
    assert_eq!(lookup("output.color_enabled").as_deref(), Some("true"));
    assert!(lookup("pipeline.limits.allowed_extensions").is_none());
    assert!(lookup("pipeline.seed").is_none());

    let keys: Vec<&String> = items.iter().map(|(k, _)| k).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_file_layer_merges_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let manager = create_test_config_manager(&temp_dir);
    fs::write(
        manager.config_path(),
        "[pipeline.limits]\nmax_files = 2\nallowed_extensions = [\"step\"]\n",
    )
    .unwrap();

    let config = manager.load().unwrap();
    assert_eq!(config.pipeline.limits.max_files, 2);
    assert_eq!(config.pipeline.limits.allowed_extensions, vec!["step"]);
    assert_eq!(config.pipeline.limits.max_name_length, 100);
}

#[test]
fn test_unusable_limits_fail_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let manager = create_test_config_manager(&temp_dir);
    fs::write(manager.config_path(), "[pipeline.limits]\nmax_files = 0\n").unwrap();

    assert!(manager.load().is_err());
}

#[test]
fn test_init_writes_valid_toml_once() {
    let temp_dir = TempDir::new().unwrap();
    let manager = create_test_config_manager(&temp_dir);

    manager.init(false).unwrap();
    let content = fs::read_to_string(manager.config_path()).unwrap();
    let parsed: toml::Value = toml::from_str(&content).unwrap();
    assert!(parsed.get("pipeline").is_some());
    assert!(parsed.get("output").is_some());

    assert!(manager.init(false).is_err());
    assert!(manager.init(true).is_ok());
    assert_eq!(manager.load().unwrap(), AppConfig::default());
}
