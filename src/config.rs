//! Configuration management for pwnix

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{PwnixError, PwnixResult};

/// Main pwnix configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwnixConfig {
    /// Log file receiving debug and error lines
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Netmask used by `set-ip` when none is given
    #[serde(default = "default_netmask")]
    pub default_netmask: String,
}

fn default_log_file() -> PathBuf {
    home_dir().join(".pwnix.log")
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_netmask() -> String {
    "24".to_string()
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}

impl Default for PwnixConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            log_level: default_log_level(),
            default_netmask: default_netmask(),
        }
    }
}

impl PwnixConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> PwnixResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| {
                PwnixError::ConfigError(format!("Failed to read config {:?}: {}", path.as_ref(), e))
            })?;

        let mut config: PwnixConfig = toml::from_str(&content)
            .map_err(|e| PwnixError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.log_file = expand_home(&config.log_file);
        Ok(config)
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must exist. Otherwise `pwnix/config.toml` under the
    /// user's config directory is used when present, and the built-in
    /// defaults when it is not.
    pub fn discover(explicit: Option<&Path>) -> PwnixResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::user_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// `$XDG_CONFIG_HOME/pwnix/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pwnix").join("config.toml"))
    }
}

/// Expand a leading `~/` against the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PwnixConfig::default();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_netmask, "24");
        assert!(config.log_file.ends_with(".pwnix.log"));
    }

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_netmask = \"16\"\n").unwrap();

        let config = PwnixConfig::load(&path).unwrap();
        assert_eq!(config.default_netmask, "16");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_expands_home() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_file = \"~/logs/pwnix.log\"\nlog_level = \"info\"\n").unwrap();

        let config = PwnixConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.ends_with("logs/pwnix.log"));
        assert!(!config.log_file.starts_with("~"));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = [").unwrap();

        assert!(matches!(PwnixConfig::load(&path), Err(PwnixError::ConfigError(_))));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            PwnixConfig::discover(Some(&missing)),
            Err(PwnixError::ConfigError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_discover_user_config() {
        let dir = TempDir::new().unwrap();
        let saved = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", dir.path());

        assert_eq!(PwnixConfig::discover(None).unwrap(), PwnixConfig::default());

        let config_dir = dir.path().join("pwnix");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "log_level = \"warn\"\n").unwrap();
        let config = PwnixConfig::discover(None).unwrap();

        match saved {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(config.log_level, "warn");
    }
}
