use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::playback::domain::presentation_clock::PausePolicy;
use crate::presentation::frame_scaler::ResizeFilter;
use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Per-session playback settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub pause_policy: PausePolicy,
    pub keep_aspect_ratio: bool,
    pub volume: f32,
    pub muted: bool,
    pub resize_filter: ResizeFilter,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            pause_policy: PausePolicy::default(),
            keep_aspect_ratio: false,
            volume: DEFAULT_VOLUME,
            muted: false,
            resize_filter: ResizeFilter::default(),
        }
    }
}

impl PlaybackConfig {
    /// `<config dir>/vidsync/config.json`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at `default_path`, falling back to defaults when it
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be between {MIN_VOLUME} and {MAX_VOLUME}, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.pause_policy, PausePolicy::Reanchor);
        assert!(!config.keep_aspect_ratio);
        assert_eq!(config.volume, 1.0);
        assert!(!config.muted);
        assert_eq!(config.resize_filter, ResizeFilter::Triangle);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let config = PlaybackConfig {
            pause_policy: PausePolicy::CatchUp,
            keep_aspect_ratio: true,
            volume: 0.25,
            muted: true,
            resize_filter: ResizeFilter::Lanczos3,
        };
        config.save(&path).unwrap();
        assert_eq!(PlaybackConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "pause_policy": "catchup" }"#).unwrap();

        let config = PlaybackConfig::load(&path).unwrap();
        assert_eq!(config.pause_policy, PausePolicy::CatchUp);
        assert_eq!(config.volume, 1.0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = PlaybackConfig::load(&tmp.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PlaybackConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_out_of_range_volume() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "volume": 1.5 }"#).unwrap();
        assert!(matches!(
            PlaybackConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_default_path_names_app_dir() {
        if let Some(path) = PlaybackConfig::default_path() {
            assert!(path.ends_with("vidsync/config.json"));
        }
    }
}
