use super::variant::BodyResourceIndices;
use serde::{Deserialize, Serialize};

/// Configuration from `Tunic Sync.yaml`
///
/// Covers the host archive layout and the ambient logging settings. The
/// synchronizer's own decision logic has no tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub body_resources: BodyResourceIndices,

    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_console_output")]
    pub console_output: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            debug_mode: false,
            console_output: default_console_output(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            body_resources: BodyResourceIndices::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "tunic-sync".to_string()
}

fn default_console_output() -> bool {
    true
}

fn default_event_buffer() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let settings = LoggingSettings::default();
        assert_eq!(settings.log_dir, "logs");
        assert_eq!(settings.log_prefix, "tunic-sync");
        assert!(!settings.debug_mode);
        assert!(settings.console_output);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: SyncConfig = serde_yaml_ng::from_str("body_resources:\n  alternate_b: 9\n").unwrap();
        assert_eq!(config.body_resources.default, 0);
        assert_eq!(config.body_resources.alternate_a, 4);
        assert_eq!(config.body_resources.alternate_b, 9);
        assert_eq!(config.event_buffer, 64);
    }
}
