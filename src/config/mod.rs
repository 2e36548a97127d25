use crate::models::{Scenario, SyncConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the synchronizer configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "Tunic Sync.yaml";

/// Prefix of environment variable overrides, e.g. `TUNIC_SYNC_LOGGING__DEBUG_MODE=true`
pub const ENV_PREFIX: &str = "TUNIC_SYNC";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages:
/// - Sync config (`Tunic Sync.yaml`): archive layout, logging, event buffer
/// - Scenario files: scripted sessions for the replay binary
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    sync_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "Tunic Sync Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            sync_config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the sync configuration.
    ///
    /// Layers, lowest priority first: built-in defaults, `Tunic Sync.yaml`
    /// (optional), `TUNIC_SYNC_*` environment variables with `__` as the
    /// nesting separator.
    pub fn load_sync_config(&self) -> Result<SyncConfig> {
        if !self.sync_config_path.exists() {
            tracing::warn!(
                "Sync config file not found at {}, using defaults",
                self.sync_config_path
            );
        }

        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::from(self.sync_config_path.as_std_path())
                    .format(::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read sync config: {}", self.sync_config_path))?;

        let config: SyncConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse sync config: {}", self.sync_config_path))?;

        tracing::info!("Loaded sync config from {}", self.sync_config_path);
        Ok(config)
    }

    /// Save the sync configuration file.
    pub fn save_sync_config(&self, config: &SyncConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize sync config to YAML")?;

        fs::write(&self.sync_config_path, yaml_string)
            .with_context(|| format!("Failed to write sync config: {}", self.sync_config_path))?;

        tracing::info!("Saved sync config to {}", self.sync_config_path);
        Ok(())
    }

    /// Load a scenario file.
    ///
    /// Relative paths are resolved against the configuration directory.
    pub fn load_scenario<P: AsRef<Utf8Path>>(&self, path: P) -> Result<Scenario> {
        let path = path.as_ref();
        let path = if path.is_relative() {
            self.config_dir.join(path)
        } else {
            path.to_path_buf()
        };

        let file_contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario: {}", path))?;

        let scenario: Scenario = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse scenario: {}", path))?;

        tracing::info!(
            "Loaded scenario '{}' ({} steps) from {}",
            scenario.name,
            scenario.steps.len(),
            path
        );
        Ok(scenario)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn sync_config_path(&self) -> &Utf8Path {
        &self.sync_config_path
    }
}
