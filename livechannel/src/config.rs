//! Configuration file format.

use std::path::{Path, PathBuf};
use std::time::Duration;

use livechannel_types::InputSource;
use serde::Deserialize;
use thiserror::Error;

use crate::inputs::InputSnapshot;
use crate::logo_fetcher::LogoFetcherConfig;
use crate::reconcile::{DuplicatePolicy, ReconcileOptions, StalePolicy};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "livechannel.toml";
pub const DEFAULT_DATABASE_PATH: &str = "livechannel.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_RETENTION_DAYS: u64 = 7;
pub const DEFAULT_PACKAGE_NAME: &str = "com.example.livechannel";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Duplicate input id in config: {0}")]
    DuplicateInput(String),
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub logo: LogoSection,
    #[serde(default)]
    pub inputs: Vec<InputSource>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DatabaseSection {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub log_dir: Option<String>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SyncSection {
    pub package_name: Option<String>,
    #[serde(default)]
    pub delete_stale: bool,
    #[serde(default)]
    pub reject_duplicates: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogoSection {
    /// Seconds per logo, `0` disables the timeout.
    pub timeout_secs: Option<u64>,
    pub max_bytes: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve the config path: explicit path, then `livechannel.toml` in the
    /// working directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        default_path.exists().then_some(default_path)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH))
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        let package_name = self
            .sync
            .package_name
            .as_deref()
            .unwrap_or(DEFAULT_PACKAGE_NAME);
        let stale = if self.sync.delete_stale {
            StalePolicy::Delete
        } else {
            StalePolicy::Keep
        };
        let duplicates = if self.sync.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::FirstWins
        };
        ReconcileOptions::new(package_name)
            .with_stale(stale)
            .with_duplicates(duplicates)
    }

    pub fn logo_config(&self) -> LogoFetcherConfig {
        let defaults = LogoFetcherConfig::default();
        let timeout = match self.logo.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.timeout,
        };
        LogoFetcherConfig {
            timeout,
            max_bytes: self.logo.max_bytes.unwrap_or(defaults.max_bytes),
        }
    }

    /// Initial input snapshot from the `[[inputs]]` tables.
    pub fn input_snapshot(&self) -> Result<InputSnapshot, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.id.as_str()) {
                return Err(ConfigError::DuplicateInput(input.id.clone()));
            }
        }
        Ok(InputSnapshot::from_inputs(self.inputs.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livechannel_types::InputState;

    const SAMPLE: &str = r#"
[database]
path = "/var/lib/livechannel/channels.db"

[logging]
log_dir = "/var/log/livechannel"
retention_days = 3
level = "debug"

[sync]
package_name = "com.example.tuner"
delete_stale = true

[logo]
timeout_secs = 0
max_bytes = 4096

[[inputs]]
id = "com.example.tuner/.TunerInputService"
label = "Tuner"
setup_activity = "com.example.tuner/.SetupActivity"

[[inputs]]
id = "com.example.hdmi/.HdmiInputService"
label = "HDMI 1"
state = "disconnected"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = ConfigFile::parse(SAMPLE).unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/var/lib/livechannel/channels.db"));
        assert_eq!(config.logging.retention_days, Some(3));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));

        let options = config.reconcile_options();
        assert_eq!(options.package_name, "com.example.tuner");
        assert_eq!(options.stale, StalePolicy::Delete);
        assert_eq!(options.duplicates, DuplicatePolicy::FirstWins);

        let logo = config.logo_config();
        assert_eq!(logo.timeout, None);
        assert_eq!(logo.max_bytes, 4096);

        let inputs = config.input_snapshot().unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.get("com.example.tuner/.TunerInputService").unwrap().has_setup());
        assert_eq!(
            inputs.get("com.example.hdmi/.HdmiInputService").unwrap().state,
            InputState::Disconnected
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigFile::parse("").unwrap();

        assert_eq!(config.database_path(), PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.reconcile_options().package_name, DEFAULT_PACKAGE_NAME);
        assert_eq!(config.reconcile_options().stale, StalePolicy::Keep);
        assert_eq!(config.logo_config().timeout, Some(Duration::from_secs(30)));
        assert!(config.input_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_inputs_rejected() {
        let config = ConfigFile::parse(
            r#"
[[inputs]]
id = "a"
label = "A"
[[inputs]]
id = "a"
label = "Again"
"#,
        )
        .unwrap();
        assert!(matches!(config.input_snapshot(), Err(ConfigError::DuplicateInput(id)) if id == "a"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livechannel.toml");
        std::fs::write(&path, "[database\n").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("livechannel.toml"));

        let missing = ConfigFile::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
