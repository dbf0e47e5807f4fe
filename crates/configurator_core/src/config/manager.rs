//! Config manager for loading session configuration.
//!
//! Key features:
//! - Clear distinction between a missing file and an unreadable one
//! - Relative paths resolved against the config file's directory
//! - Validation on load (game and schema must be set, at most three files)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::SessionConfig;
use crate::session::MAX_CANDIDATE_FILES;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Holds the loaded session configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Settings with relative paths already resolved.
    config: SessionConfig,
}

impl ConfigManager {
    /// Load and validate the config file at `config_path`.
    pub fn load(config_path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_path = config_path.into();
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(config_path));
            }
            Err(e) => return Err(e.into()),
        };

        let mut config = parse_and_validate(&content)?;
        if let Some(dir) = config_path.parent() {
            config.resolve_relative_to(dir);
        }
        tracing::debug!("Loaded config {} for '{}'", config_path.display(), config.game);

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the loaded settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Take the loaded settings.
    pub fn into_config(self) -> SessionConfig {
        self.config
    }
}

/// Parse and validate config content.
fn parse_and_validate(content: &str) -> ConfigResult<SessionConfig> {
    let config: SessionConfig = toml::from_str(content)?;

    if config.game.trim().is_empty() {
        return Err(ConfigError::Invalid("game must be set".to_string()));
    }
    if config.schema.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("schema must be set".to_string()));
    }
    if config.paths.ini_files.len() > MAX_CANDIDATE_FILES {
        return Err(ConfigError::Invalid(format!(
            "at most {} ini files are supported, got {}",
            MAX_CANDIDATE_FILES,
            config.paths.ini_files.len()
        )));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn loads_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(
            &path,
            r#"
game = "skyrimse"
schema = "settings.json"

[paths]
profile_dir = "profiles/Default"
documents_dir = "/docs/Skyrim"
local_settings = true

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let manager = ConfigManager::load(&path).unwrap();
        let config = manager.config();

        assert_eq!(manager.path(), path);
        assert_eq!(config.schema, dir.path().join("settings.json"));
        assert_eq!(config.base_dir(), dir.path().join("profiles/Default"));
        assert_eq!(
            config.candidate_files(),
            vec!["skyrim.ini".to_string(), "skyrimprefs.ini".to_string()]
        );
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = parse_and_validate("game = \"custom\"\nschema = \"s.json\"\n").unwrap();

        assert!(!config.paths.local_settings);
        assert!(config.paths.ini_files.is_empty());
        assert!(config.candidate_files().is_empty());
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn explicit_ini_files_override_catalog() {
        let config = parse_and_validate(
            "game = \"skyrim\"\nschema = \"s.json\"\n[paths]\nini_files = [\"a.ini\"]\n",
        )
        .unwrap();

        assert_eq!(config.candidate_files(), vec!["a.ini".to_string()]);
    }

    #[test]
    fn reports_missing_and_invalid_files() {
        let dir = tempdir().unwrap();

        assert!(matches!(
            ConfigManager::load(dir.path().join("nope.toml")),
            Err(ConfigError::NotFound(_))
        ));
        assert!(matches!(
            parse_and_validate("game = ["),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            parse_and_validate("schema = \"s.json\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_and_validate(
                "game = \"g\"\nschema = \"s.json\"\n[paths]\nini_files = [\"a\", \"b\", \"c\", \"d\"]\n"
            ),
            Err(ConfigError::Invalid(_))
        ));
    }
}
