//! `config.json`: optional defaults for every command-line setting.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of the config file. Every field is optional; command-line values win.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub auth_service: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub blocked_species_ids: Option<Vec<u32>>,

    #[serde(default)]
    pub minimum_combat_power: Option<u32>,

    #[serde(default)]
    pub release_delay_secs: Option<f64>,

    #[serde(default)]
    pub cell_radius: Option<u32>,
}

impl FileConfig {
    /// Load `path`. A missing file is not an error and yields `None`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loaded config file");
                Self::from_json_str(&contents).map(Some)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secs) = self.release_delay_secs {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "release_delay_secs must be a non-negative number, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileConfig::load(dir.path().join("config.json")).unwrap().is_none());
    }

    #[test]
    fn parses_all_keys() {
        let config = FileConfig::from_json_str(
            r#"{
                "auth_service": "ptc",
                "username": "ash",
                "location": "Shibuya",
                "blocked_species_ids": [16, 41],
                "minimum_combat_power": 199,
                "release_delay_secs": 3,
                "cell_radius": 10
            }"#,
        )
        .unwrap();
        assert_eq!(config.auth_service.as_deref(), Some("ptc"));
        assert_eq!(config.password, None);
        assert_eq!(config.blocked_species_ids, Some(vec![16, 41]));
        assert_eq!(config.release_delay_secs, Some(3.0));
    }

    #[test]
    fn negative_delay_is_invalid() {
        let err = FileConfig::from_json_str(r#"{ "release_delay_secs": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileConfig::load(&path), Err(ConfigError::Json(_))));
    }
}
