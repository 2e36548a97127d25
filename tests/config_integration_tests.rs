//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Default configuration when no file exists
//! - Configuration saving and loading
//! - Hand-written YAML with partial sections
//! - Environment overrides layered over the YAML file
//! - Scenario loading from relative and absolute paths

use camino::Utf8PathBuf;
use std::fs;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;
use tunic_sync::models::Step;
use tunic_sync::{AgeState, ConfigManager, SyncConfig, Variant};

// Serializes tests that read the process environment through load_sync_config.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
}

#[test]
fn test_create_missing_config_dir() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("Tunic Sync Data");

    let manager = ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
    assert_eq!(manager.config_dir(), &nested);
}

#[test]
fn test_load_default_sync_config() {
    let _env = env_guard();
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    // Config file doesn't exist, should return defaults
    let config = manager.load_sync_config().unwrap();

    assert_eq!(config, SyncConfig::default());
    assert_eq!(config.body_resources.default, 0);
    assert_eq!(config.body_resources.alternate_a, 4);
    assert_eq!(config.body_resources.alternate_b, 5);
}

#[test]
fn test_save_and_load_sync_config() {
    let _env = env_guard();
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = manager.load_sync_config().unwrap();
    config.logging.log_prefix = "player".to_string();
    config.event_buffer = 8;

    manager.save_sync_config(&config).unwrap();
    let loaded = manager.load_sync_config().unwrap();

    assert_eq!(loaded.logging.log_prefix, "player");
    assert_eq!(loaded.event_buffer, 8);
}

#[test]
fn test_hand_written_partial_config() {
    let _env = env_guard();
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let yaml = r#"
logging:
  debug_mode: true
body_resources:
  alternate_a: 14
"#;
    fs::write(manager.sync_config_path(), yaml).unwrap();

    let config = manager.load_sync_config().unwrap();

    assert!(config.logging.debug_mode);
    assert_eq!(config.logging.log_dir, "logs");
    assert_eq!(config.body_resources.alternate_a, 14);
    assert_eq!(config.body_resources.alternate_b, 5);
}

#[test]
fn test_invalid_config_is_an_error() {
    let _env = env_guard();
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.sync_config_path(), "event_buffer: [not, a, number]\n").unwrap();

    assert!(manager.load_sync_config().is_err());
}

#[test]
fn test_environment_overrides_yaml() {
    let _env = env_guard();
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = SyncConfig::default();
    config.logging.debug_mode = false;
    config.event_buffer = 32;
    config.body_resources.alternate_b = 9;
    manager.save_sync_config(&config).unwrap();

    // SAFETY: every test in this file that reads the environment holds ENV_LOCK.
    unsafe {
        std::env::set_var("TUNIC_SYNC_LOGGING__DEBUG_MODE", "true");
        std::env::set_var("TUNIC_SYNC_EVENT_BUFFER", "7");
    }
    let loaded = manager.load_sync_config();
    unsafe {
        std::env::remove_var("TUNIC_SYNC_LOGGING__DEBUG_MODE");
        std::env::remove_var("TUNIC_SYNC_EVENT_BUFFER");
    }

    let loaded = loaded.unwrap();
    assert!(loaded.logging.debug_mode);
    assert_eq!(loaded.event_buffer, 7);
    // Values without an override still come from the file.
    assert_eq!(loaded.body_resources.alternate_b, 9);
    assert_eq!(loaded.logging.log_prefix, "tunic-sync");
}

#[test]
fn test_load_scenario_absolute_path() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(config_path.join("cfg")).unwrap();

    let scenario_path = config_path.join("young.yaml");
    fs::write(
        &scenario_path,
        "name: young\nage: young\nsteps:\n  - action: drop_resource\n    variant: alternate_b\n",
    )
    .unwrap();

    let scenario = manager.load_scenario(&scenario_path).unwrap();

    assert_eq!(scenario.age, AgeState::Young);
    assert_eq!(
        scenario.steps,
        vec![Step::DropResource {
            variant: Variant::AlternateB
        }]
    );
}
