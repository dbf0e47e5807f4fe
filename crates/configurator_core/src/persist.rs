//! Writing changed settings back to their files.
//!
//! Key features:
//! - Fresh re-read of every candidate file before writing (external edits
//!   made since the session was opened are kept)
//! - Only settings whose value differs from the on-disk value are written
//! - Only files with pending changes are rewritten, each atomically
//! - Files that do not exist are never created

use std::path::Path;

use indexmap::IndexMap;

use crate::caseless::normalize;
use crate::coerce::encode;
use crate::ini::{ConfigFile, IniError};
use crate::schema::{Schema, Value};

/// Errors that can occur while saving.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Ini(#[from] IniError),

    #[error("[{section}] {key} belongs in {file}, which does not exist")]
    MissingTargetFile {
        section: String,
        key: String,
        file: String,
    },

    #[error("[{section}] {key} has no target file")]
    NoTargetFile { section: String, key: String },
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// What a successful save did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Files rewritten, in candidate order.
    pub written_files: Vec<String>,
    /// Number of settings whose new value was written.
    pub saved_settings: usize,
}

/// A candidate file loaded for writing plus the settings destined for it.
struct PendingFile {
    name: String,
    content: ConfigFile,
    updates: Vec<(String, String, Value)>,
}

/// Write every unsaved setting in `schema` to its target file.
///
/// Nothing is written if any changed setting targets a file that does not
/// exist or any candidate file cannot be read. Once writing starts, a
/// failure on one file does not stop the others; `saved` is updated only
/// for settings whose file was written, and the first failure is returned.
/// Files written before a failure are not rolled back.
pub fn save(
    schema: &mut Schema,
    base_dir: &Path,
    candidates: &[String],
) -> SaveResult<SaveReport> {
    let mut files: IndexMap<String, PendingFile> = IndexMap::new();
    for name in candidates {
        if let Some(content) = ConfigFile::read_existing(&base_dir.join(name))? {
            files.insert(
                normalize(name),
                PendingFile {
                    name: name.clone(),
                    content,
                    updates: Vec::new(),
                },
            );
        }
    }

    for (section_name, section) in schema.iter() {
        for (key, setting) in section.iter().filter(|(_, s)| s.is_unsaved()) {
            let target = setting
                .target_file
                .as_deref()
                .ok_or_else(|| SaveError::NoTargetFile {
                    section: section_name.to_string(),
                    key: key.to_string(),
                })?;
            let pending = files.get_mut(&normalize(target)).ok_or_else(|| {
                SaveError::MissingTargetFile {
                    section: section_name.to_string(),
                    key: key.to_string(),
                    file: target.to_string(),
                }
            })?;

            pending
                .content
                .set(section_name, key, &encode(&setting.value));
            pending.updates.push((
                section_name.to_string(),
                key.to_string(),
                setting.value.clone(),
            ));
        }
    }

    let mut report = SaveReport::default();
    let mut first_error = None;
    for pending in files.into_values().filter(|p| !p.updates.is_empty()) {
        let path = base_dir.join(&pending.name);
        if let Err(e) = pending.content.write_atomic(&path) {
            tracing::error!("{}", e);
            first_error.get_or_insert(e);
            continue;
        }

        tracing::info!(
            "Wrote {} setting(s) to {}",
            pending.updates.len(),
            path.display()
        );
        for (section, key, value) in pending.updates {
            if let Some(setting) = schema.get_mut(&section).and_then(|s| s.get_mut(&key)) {
                setting.saved = Some(value);
                report.saved_settings += 1;
            }
        }
        report.written_files.push(pending.name);
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(report),
    }
}
