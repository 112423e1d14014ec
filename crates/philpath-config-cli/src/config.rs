//! CLI configuration management.
//!
//! Defaults are overridden by the settings file, then by `.env` and
//! environment variables, then by command-line flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use philpath_config_core::{ClassType, DEFAULT_OUTPUT_FILE};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the default class type.
pub const ENV_CLASS_TYPE: &str = "PHILPATH_CLASS_TYPE";

/// Environment variable overriding the default output path.
pub const ENV_OUTPUT: &str = "PHILPATH_OUTPUT";

/// Environment variable pointing at an alternative settings file.
pub const ENV_CONFIG_FILE: &str = "PHILPATH_CONFIG";

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Type for classes no name rule matches.
    pub default_class_type: ClassType,

    /// Output file used when none is given on the command line.
    pub output: PathBuf,

    /// Raw `PHILPATH_CLASS_TYPE` value. Parsed only when no flag overrides it.
    #[serde(skip)]
    pub class_type_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_class_type: ClassType::Structure,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            class_type_env: None,
        }
    }
}

impl Config {
    /// Load configuration from the settings file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        // Environment variables take precedence over the file
        config.class_type_env = std::env::var(ENV_CLASS_TYPE).ok();
        if let Ok(output) = std::env::var(ENV_OUTPUT) {
            config.output = PathBuf::from(output);
        }

        Ok(config)
    }

    /// Default class type for a run: the flag, then the environment, then the file.
    pub fn resolve_class_type(&self, flag: Option<ClassType>) -> Result<ClassType> {
        if let Some(class_type) = flag {
            return Ok(class_type);
        }
        match &self.class_type_env {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid {ENV_CLASS_TYPE}")),
            None => Ok(self.default_class_type),
        }
    }

    /// Read a settings file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the path to the settings file.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("org", "philpath", "philpath-config")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_class_type, ClassType::Structure);
        assert_eq!(config.output, PathBuf::from("channels.json"));
    }

    #[test]
    fn test_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"default_class_type": "BOUNDARY"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.default_class_type, ClassType::Boundary);
        assert_eq!(config.output, PathBuf::from("channels.json"));
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"default_class_type": "TISSUE"}"#).unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_class_type_precedence() {
        let config = Config {
            default_class_type: ClassType::Boundary,
            ..Config::default()
        };
        assert_eq!(config.resolve_class_type(None).unwrap(), ClassType::Boundary);

        let config = Config {
            class_type_env: Some("background".to_string()),
            ..config
        };
        assert_eq!(config.resolve_class_type(None).unwrap(), ClassType::Background);
        assert_eq!(
            config.resolve_class_type(Some(ClassType::Structure)).unwrap(),
            ClassType::Structure
        );
    }

    #[test]
    fn test_invalid_env_class_type_only_fails_without_flag() {
        let config = Config {
            class_type_env: Some("TISSUE".to_string()),
            ..Config::default()
        };
        assert!(config.resolve_class_type(None).is_err());
        assert_eq!(
            config.resolve_class_type(Some(ClassType::Boundary)).unwrap(),
            ClassType::Boundary
        );
    }
}
