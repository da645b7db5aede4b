use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timing and presentation knobs. Every field has a default so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub shuffle_iterations: u32,
    pub shuffle_interval_ms: u64,
    pub shuffle_settle_ms: u64,
    pub countdown_secs: u32,
    pub countdown_warning_secs: u32,
    pub history_limit: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            poll_interval_ms: 1000 / 30,
            settle_delay_ms: 500,
            shuffle_iterations: 10,
            shuffle_interval_ms: 200,
            shuffle_settle_ms: 1000,
            countdown_secs: 45,
            countdown_warning_secs: 5,
            history_limit: None,
        }
    }
}

impl GameConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn shuffle_interval(&self) -> Duration {
        Duration::from_millis(self.shuffle_interval_ms)
    }

    pub fn shuffle_settle(&self) -> Duration {
        Duration::from_millis(self.shuffle_settle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("poll_interval_ms must be positive".into()));
        }
        if self.shuffle_interval_ms == 0 {
            return Err(Error::InvalidConfig("shuffle_interval_ms must be positive".into()));
        }
        if self.countdown_secs == 0 {
            return Err(Error::InvalidConfig("countdown_secs must be positive".into()));
        }
        if self.countdown_warning_secs >= self.countdown_secs {
            return Err(Error::InvalidConfig(format!(
                "countdown_warning_secs ({}) must be below countdown_secs ({})",
                self.countdown_warning_secs, self.countdown_secs
            )));
        }
        Ok(())
    }

    /// Reads and validates a JSON config. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let config: GameConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`GameConfig::load_from`] but never fails: problems are logged and defaults used.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => {
                info!("game config: {:?}", config);
                config
            }
            Err(err) => {
                warn!("ignoring config at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.poll_interval_ms, 33);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "countdown_secs": 60, "history_limit": 10 }}"#).unwrap();
        let config = GameConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config,
            GameConfig {
                countdown_secs: 60,
                history_limit: Some(10),
                ..GameConfig::default()
            }
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn bad_values_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "countdown_secs": 5, "countdown_warning_secs": 5 }}"#).unwrap();
        assert!(matches!(
            GameConfig::load_from(file.path()),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(GameConfig::load_or_default(file.path()), GameConfig::default());
    }

    #[test]
    fn garbage_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(GameConfig::load_from(file.path()), Err(Error::Json(_))));
    }
}
