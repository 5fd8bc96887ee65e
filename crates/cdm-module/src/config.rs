//! Configuration loading and types

use std::path::{Path, PathBuf};

use cdm_client::ClientOptions;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CDM_MODULE_CONFIG";

/// Top-level configuration for the module runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// Cluster connection settings
    #[serde(default)]
    pub connection: ConnectionSettings,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Cluster connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Verify the cluster's TLS certificate, off for self-signed clusters
    #[serde(default)]
    pub verify_tls: bool,
}

impl ConnectionSettings {
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            verify_tls: self.verify_tls,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Candidate config files, most specific first
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("cdm-module.toml"),
            PathBuf::from("/etc/cdm-module/cdm-module.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cdm-module/cdm-module.toml"));
        }
        paths
    }

    /// Load from `CDM_MODULE_CONFIG` or the default paths, else defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> eyre::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        match Self::search_paths().into_iter().find(|path| path.exists()) {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log.level, "warn");
        assert!(!config.connection.client_options().verify_tls);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"debug\"\n\n[connection]\nverify_tls = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.log.level, "debug");
        assert!(config.connection.verify_tls);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log\nlevel = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }
}
