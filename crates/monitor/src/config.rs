//! Monitor configuration management

use crate::report::OutputFormat;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest accepted receive buffer
pub const MIN_BUFFER_SIZE: usize = 256;
/// Largest accepted receive buffer (1 MiB)
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Uevent channel settings
///
/// The multicast group is fixed to the kernel uevent group and cannot be
/// configured; unknown keys such as `groups` are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSettings {
    /// Receive buffer size in bytes; longer uevents are truncated
    #[serde(default = "MonitorSettings::default_buffer_size")]
    pub buffer_size: usize,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "MonitorSettings::default_log_level")]
    pub log_level: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            buffer_size: Self::default_buffer_size(),
            log_level: Self::default_log_level(),
        }
    }
}

impl MonitorSettings {
    fn default_buffer_size() -> usize {
        protocol::DEFAULT_BUFFER_SIZE
    }

    fn default_log_level() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

impl MonitorConfig {
    /// Load configuration from the specified path
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: MonitorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load the first configuration file found in the standard locations
    ///
    /// Defaults are used only when no file exists. A file that exists but
    /// fails to parse or validate is an error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_first_existing(&[
            Self::default_path(),
            PathBuf::from("/etc/usb-uevent-monitor/monitor.toml"),
        ])
    }

    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-uevent-monitor").join("monitor.toml")
        } else {
            PathBuf::from(".config/usb-uevent-monitor/monitor.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.monitor.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.monitor.log_level,
                valid_levels.join(", ")
            ));
        }

        if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&self.monitor.buffer_size) {
            return Err(anyhow!(
                "Invalid buffer_size {}, must be between {} and {} bytes",
                self.monitor.buffer_size,
                MIN_BUFFER_SIZE,
                MAX_BUFFER_SIZE
            ));
        }

        Ok(())
    }
}

/// Expand `~` in a user-supplied config path
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.monitor.buffer_size, 4096);
        assert_eq!(config.monitor.log_level, "info");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
[monitor]
buffer_size = 8192
"#,
        )
        .unwrap();
        assert_eq!(config.monitor.buffer_size, 8192);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_output_format_parsing() {
        let config: MonitorConfig = toml::from_str(
            r#"
[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);

        assert!(toml::from_str::<MonitorConfig>("[output]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_validate_buffer_size() {
        let mut config = MonitorConfig::default();

        config.monitor.buffer_size = MIN_BUFFER_SIZE - 1;
        assert!(config.validate().is_err());

        config.monitor.buffer_size = MAX_BUFFER_SIZE + 1;
        assert!(config.validate().is_err());

        config.monitor.buffer_size = MIN_BUFFER_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = MonitorConfig::default();
        config.monitor.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.monitor.log_level = "trace".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_multicast_group_not_configurable() {
        for groups in ["2", "4294967295", "1"] {
            let content = format!("[monitor]\ngroups = {}\n", groups);
            assert!(
                toml::from_str::<MonitorConfig>(&content).is_err(),
                "groups = {} should be rejected",
                groups
            );
        }
    }

    #[test]
    fn test_load_rejects_group_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "[monitor]\ngroups = 2\n").unwrap();

        assert!(MonitorConfig::load(&path).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("monitor.toml");

        let mut config = MonitorConfig::default();
        config.monitor.buffer_size = 16384;
        config.output.format = OutputFormat::Json;
        config.save(&path).unwrap();

        let loaded = MonitorConfig::load(&path).unwrap();
        assert_eq!(loaded.monitor.buffer_size, 16384);
        assert_eq!(loaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "[monitor]\nbuffer_size = 16\n").unwrap();

        assert!(MonitorConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let candidates = [dir.path().join("a.toml"), dir.path().join("b.toml")];

        let config = MonitorConfig::load_first_existing(&candidates).unwrap();
        assert_eq!(config.monitor.buffer_size, protocol::DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_invalid_file_at_standard_location_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let invalid = dir.path().join("monitor.toml");
        fs::write(&invalid, "[monitor]\nbuffer_size = 16\n").unwrap();

        let err = MonitorConfig::load_first_existing(&[missing, invalid]).unwrap_err();
        assert!(format!("{:#}", err).contains("buffer_size"));
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempdir().unwrap();
        let user = dir.path().join("user.toml");
        let system = dir.path().join("system.toml");
        fs::write(&user, "[monitor]\nbuffer_size = 8192\n").unwrap();
        fs::write(&system, "[monitor]\nbuffer_size = 16384\n").unwrap();

        let config = MonitorConfig::load_first_existing(&[user, system]).unwrap();
        assert_eq!(config.monitor.buffer_size, 8192);
    }

    #[test]
    fn test_expand_path_leaves_absolute_paths() {
        let path = Path::new("/etc/usb-uevent-monitor/monitor.toml");
        assert_eq!(expand_path(path), path);
    }
}
