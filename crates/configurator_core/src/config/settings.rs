//! Session configuration read from TOML.
//!
//! Sections map to TOML tables. Every field has a default so partial files
//! load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::games;
use crate::logging::LogLevel;

/// Root configuration for one editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Active game short name, e.g. `skyrimse`.
    #[serde(default)]
    pub game: String,

    /// Schema document path. Relative paths are resolved against the
    /// config file's directory on load.
    #[serde(default)]
    pub schema: PathBuf,

    /// Where the INI files live.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl SessionConfig {
    /// Directory holding the INI files.
    pub fn base_dir(&self) -> PathBuf {
        games::resolve_base_dir(
            &self.paths.profile_dir,
            self.paths.local_settings,
            &self.paths.documents_dir,
        )
    }

    /// Candidate files: the explicit list if given, else the catalog entry
    /// for the game.
    pub fn candidate_files(&self) -> Vec<String> {
        if self.paths.ini_files.is_empty() {
            games::candidate_files(&self.game)
        } else {
            self.paths.ini_files.clone()
        }
    }

    /// Resolve relative paths against `dir`.
    pub(crate) fn resolve_relative_to(&mut self, dir: &Path) {
        for path in [
            &mut self.schema,
            &mut self.paths.profile_dir,
            &mut self.paths.documents_dir,
        ] {
            if !path.as_os_str().is_empty() && path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

/// INI file location settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Profile directory, used when the profile has local settings.
    #[serde(default)]
    pub profile_dir: PathBuf,

    /// The game's folder under the user's documents.
    #[serde(default)]
    pub documents_dir: PathBuf,

    /// Read INI files from the profile instead of documents.
    #[serde(default)]
    pub local_settings: bool,

    /// Explicit candidate files; empty uses the built-in catalog.
    #[serde(default)]
    pub ini_files: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,
}
