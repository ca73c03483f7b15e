//! User settings and credential resolution.
//!
//! Settings live in a small YAML file (`~/.api-digest/config.yaml`). The API key is resolved
//! from the `GEMINI_API_KEY` environment variable first and the settings file second; the
//! resolution itself is a pure function so callers decide where the inputs come from.

use crate::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Environment variable consulted before the settings file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when the settings file does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Settings {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }
}

/// Picks the API key: a non-empty environment value wins over the settings file.
pub fn resolve_api_key(env_value: Option<String>, settings: &Settings) -> Option<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| settings.api_key.clone().filter(|k| !k.trim().is_empty()))
}

/// Masks a key for display, keeping only its first and last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Reads and writes the settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the default per-user location.
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::new(home.join(".api-digest").join("config.yaml")))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the settings; a missing file yields defaults.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config file at {}", self.path.display());
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_yaml::to_string(settings).map_err(|source| ConfigError::Yaml {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn set_api_key(&self, api_key: &str) -> Result<(), ConfigError> {
        let mut settings = self.load()?;
        settings.api_key = Some(api_key.trim().to_string());
        self.save(&settings)
    }

    pub fn set_model(&self, model: &str) -> Result<(), ConfigError> {
        let mut settings = self.load()?;
        settings.model = Some(model.trim().to_string());
        self.save(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_env_key_wins_over_file() {
        let settings = Settings {
            api_key: Some("from-file".to_string()),
            model: None,
        };

        assert_eq!(
            resolve_api_key(Some("from-env".to_string()), &settings),
            Some("from-env".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("  ".to_string()), &settings),
            Some("from-file".to_string())
        );
        assert_eq!(
            resolve_api_key(None, &settings),
            Some("from-file".to_string())
        );
        assert_eq!(resolve_api_key(None, &Settings::default()), None);
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "****");
        assert_eq!(mask_api_key("12345678"), "****");
        assert_eq!(mask_api_key("AIzaSyExampleKey1234"), "AIza...1234");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.yaml"));

        let settings = store.load().unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_set_api_key_and_model_persist() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("nested/config.yaml"));

        store.set_api_key("secret-key-value").unwrap();
        store.set_model("gemini-1.5-flash").unwrap();

        let settings = ConfigStore::new(store.path().clone()).load().unwrap();
        assert_eq!(
            settings,
            Settings {
                api_key: Some("secret-key-value".to_string()),
                model: Some("gemini-1.5-flash".to_string()),
            }
        );
        assert_eq!(settings.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_load_invalid_yaml_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "api_key: [unclosed").unwrap();

        let err = ConfigStore::new(path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
