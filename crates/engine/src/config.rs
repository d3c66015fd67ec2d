//! Engine configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration
///
/// Every field has a default matching the supported device's observed
/// behavior; a config file only needs the fields it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bound on waiting for any non-session-open response
    #[serde(default = "EngineConfig::default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Bound on waiting for an OpenSession response
    #[serde(default = "EngineConfig::default_session_open_timeout_ms")]
    pub session_open_timeout_ms: u64,

    /// Total OpenSession attempts before giving up
    #[serde(default = "EngineConfig::default_session_open_attempts")]
    pub session_open_attempts: u32,

    /// Pause before each OpenSession attempt after the first
    #[serde(default = "EngineConfig::default_session_retry_delay_ms")]
    pub session_retry_delay_ms: u64,

    /// Session id requested from the device
    #[serde(default = "EngineConfig::default_session_id")]
    pub session_id: u32,

    /// Fixed capacity of the bulk IN receive buffer
    #[serde(default = "EngineConfig::default_read_capacity")]
    pub read_capacity: usize,

    /// Optional `"vid:pid"` hex filters narrowing discovery
    ///
    /// Empty means every attached device is a candidate, which is the
    /// default scan behavior.
    #[serde(default)]
    pub device_filters: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: Self::default_response_timeout_ms(),
            session_open_timeout_ms: Self::default_session_open_timeout_ms(),
            session_open_attempts: Self::default_session_open_attempts(),
            session_retry_delay_ms: Self::default_session_retry_delay_ms(),
            session_id: Self::default_session_id(),
            read_capacity: Self::default_read_capacity(),
            device_filters: Vec::new(),
        }
    }
}

impl EngineConfig {
    fn default_response_timeout_ms() -> u64 {
        8_000
    }

    fn default_session_open_timeout_ms() -> u64 {
        10_000
    }

    fn default_session_open_attempts() -> u32 {
        3
    }

    fn default_session_retry_delay_ms() -> u64 {
        500
    }

    fn default_session_id() -> u32 {
        1
    }

    fn default_read_capacity() -> usize {
        4096
    }

    /// Response deadline as a `Duration`
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// OpenSession deadline as a `Duration`
    pub fn session_open_timeout(&self) -> Duration {
        Duration::from_millis(self.session_open_timeout_ms)
    }

    /// Inter-attempt pause as a `Duration`
    pub fn session_retry_delay(&self) -> Duration {
        Duration::from_millis(self.session_retry_delay_ms)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| common::Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Default config file location under the user config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("switch-mtp")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_device_bounds() {
        let config = EngineConfig::default();
        assert_eq!(config.response_timeout(), Duration::from_secs(8));
        assert_eq!(config.session_open_timeout(), Duration::from_secs(10));
        assert_eq!(config.session_open_attempts, 3);
        assert_eq!(config.session_retry_delay(), Duration::from_millis(500));
        assert_eq!(config.session_id, 1);
        assert!(config.device_filters.is_empty());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "response_timeout_ms = 250").unwrap();
        writeln!(file, "device_filters = [\"057e:2000\"]").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.response_timeout_ms, 250);
        assert_eq!(config.device_filters, vec!["057e:2000".to_string()]);
        assert_eq!(config.session_open_attempts, 3);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "response_timeout_ms = \"soon\"").unwrap();

        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(common::Error::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/switch-mtp.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }
}
