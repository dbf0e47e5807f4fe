//! An editing session over one game's INI files.
//!
//! Opening a session filters the schema for the game, then reconciles it
//! with the files on disk. Edits go through [`Session::apply_edits`] and
//! reach disk only on [`Session::save`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use configurator_core::edit::Edit;
//! use configurator_core::schema::{load_schema_file, Value};
//! use configurator_core::session::{Session, SessionInputs};
//!
//! let mut session = Session::open(SessionInputs {
//!     schema: load_schema_file("settings.json".as_ref()).unwrap(),
//!     game: "skyrimse".to_string(),
//!     candidate_files: vec!["skyrim.ini".to_string(), "skyrimprefs.ini".to_string()],
//!     base_dir: PathBuf::from("/docs/My Games/Skyrim Special Edition"),
//! })
//! .unwrap();
//!
//! session
//!     .apply_edits(&[Edit::new("Display", "iSize H", Value::Int(1080))])
//!     .unwrap();
//! session.save().unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConfigManager, SessionConfig};
use crate::edit::{self, Edit, EditResult};
use crate::logging;
use crate::persist::{self, SaveReport, SaveResult};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::schema::{filter_schema, load_schema_file, Schema, SchemaError};

/// Games read at most a main, a prefs and a custom file.
pub const MAX_CANDIDATE_FILES: usize = 3;

/// Everything the host supplies to open a session.
#[derive(Debug, Clone)]
pub struct SessionInputs {
    /// Static schema, before filtering for the game.
    pub schema: Schema,
    pub game: String,
    /// Ordered file names: main first, prefs second.
    pub candidate_files: Vec<String>,
    /// Directory holding the candidate files.
    pub base_dir: PathBuf,
}

/// Errors that prevent a session from opening.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("At most {max} candidate files are supported, got {count}")]
    TooManyCandidateFiles { count: usize, max: usize },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session state: the filtered schema plus where its files live.
#[derive(Debug)]
pub struct Session {
    game: String,
    candidate_files: Vec<String>,
    base_dir: PathBuf,
    schema: Schema,
    report: ReconcileReport,
}

impl Session {
    /// Filter `inputs.schema` for the game and reconcile it with disk.
    pub fn open(inputs: SessionInputs) -> SessionResult<Self> {
        let SessionInputs {
            schema,
            game,
            candidate_files,
            base_dir,
        } = inputs;

        if candidate_files.len() > MAX_CANDIDATE_FILES {
            return Err(SessionError::TooManyCandidateFiles {
                count: candidate_files.len(),
                max: MAX_CANDIDATE_FILES,
            });
        }
        if candidate_files.is_empty() {
            tracing::warn!("No ini files known for game '{}'", game);
        }

        let mut schema = filter_schema(&schema, &game, &candidate_files);
        let report = reconcile(&mut schema, &base_dir, &candidate_files);
        tracing::info!(
            "Opened session for '{}' in {} ({} section(s))",
            game,
            base_dir.display(),
            schema.len()
        );

        Ok(Self {
            game,
            candidate_files,
            base_dir,
            schema,
            report,
        })
    }

    /// Open a session described by a loaded config.
    pub fn from_config(config: &SessionConfig) -> SessionResult<Self> {
        let schema = load_schema_file(&config.schema)?;
        Self::open(SessionInputs {
            schema,
            game: config.game.clone(),
            candidate_files: config.candidate_files(),
            base_dir: config.base_dir(),
        })
    }

    /// Load the config file at `path` and open the session it describes.
    ///
    /// Also installs the global tracing subscriber at the configured log
    /// level, unless the host already installed one.
    pub fn from_config_file(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let manager = ConfigManager::load(path)?;
        let config = manager.config();
        if logging::init_tracing(config.logging.level) {
            tracing::debug!(
                "Logging at {:?} as configured in {}",
                config.logging.level,
                manager.path().display()
            );
        }
        Self::from_config(config)
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn candidate_files(&self) -> &[String] {
        &self.candidate_files
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The filtered, reconciled schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// What reconciliation found when the session was opened.
    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    /// Validate and apply a batch of edits; see [`edit::apply_edits`].
    pub fn apply_edits(&mut self, edits: &[Edit]) -> EditResult<usize> {
        edit::apply_edits(&mut self.schema, edits)
    }

    /// `(section, key)` of every setting whose value differs from disk.
    pub fn unsaved(&self) -> Vec<(&str, &str)> {
        self.schema
            .iter()
            .flat_map(|(section_name, section)| {
                section
                    .iter()
                    .filter(|(_, setting)| setting.is_unsaved())
                    .map(move |(key, _)| (section_name, key))
            })
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.schema
            .values()
            .any(|section| section.values().any(|setting| setting.is_unsaved()))
    }

    /// Write every unsaved setting to its file.
    pub fn save(&mut self) -> SaveResult<SaveReport> {
        let result = persist::save(&mut self.schema, &self.base_dir, &self.candidate_files);
        if let Err(e) = &result {
            tracing::error!("Failed to save settings for '{}': {}", self.game, e);
        }
        result
    }
}
