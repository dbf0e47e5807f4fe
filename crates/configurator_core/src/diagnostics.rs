//! Structured diagnostics produced while reading config files.
//!
//! These describe content the schema did not expect. They are logged and
//! collected, but never shown to the user as errors: the affected entry is
//! simply left alone.

use std::fmt;

use crate::schema::Value;

/// What went wrong with a config file entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// The file declares a section the schema does not know.
    UnexpectedSection,
    /// The section is known but the key is not.
    UnknownSetting,
    /// The setting belongs in another file.
    WrongFile { expected: String },
    /// A key/value line appears before the first section header.
    EntryOutsideSection,
    /// The value was outside the setting's range and has been clamped.
    OutOfRange { clamped_to: Value },
    /// An enum setting holds a value not among its listed values.
    UnlistedEnumValue,
    /// The file exists but could not be read.
    UnreadableFile { error: String },
}

/// One diagnostic, tied to the file (and usually the entry) it concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub section: Option<String>,
    pub key: Option<String>,
    /// Raw value text, when the diagnostic concerns a value.
    pub raw: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, file: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            section: None,
            key: None,
            raw: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_entry(mut self, key: impl Into<String>, raw: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.raw = Some(raw.into());
        self
    }

    /// Emit this diagnostic to the log.
    pub(crate) fn log(&self) {
        match self.kind {
            DiagnosticKind::UnreadableFile { .. } => tracing::warn!("{}", self),
            _ => tracing::debug!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = self.section.as_deref().unwrap_or("");
        let key = self.key.as_deref().unwrap_or("");
        match &self.kind {
            DiagnosticKind::UnexpectedSection => {
                write!(f, "unexpected section [{}] in {}", section, self.file)
            }
            DiagnosticKind::UnknownSetting => {
                write!(f, "unknown ini setting [{}] {} in {}", section, key, self.file)
            }
            DiagnosticKind::WrongFile { expected } => write!(
                f,
                "[{}] {} in wrong ini file ({}, should be {})",
                section, key, self.file, expected
            ),
            DiagnosticKind::EntryOutsideSection => {
                write!(f, "{} appears before any section in {}", key, self.file)
            }
            DiagnosticKind::OutOfRange { clamped_to } => write!(
                f,
                "[{}] {}={} in {} is out of range, clamped to {}",
                section,
                key,
                self.raw.as_deref().unwrap_or(""),
                self.file,
                clamped_to
            ),
            DiagnosticKind::UnlistedEnumValue => write!(
                f,
                "[{}] {}={} in {} is not one of the listed values",
                section,
                key,
                self.raw.as_deref().unwrap_or(""),
                self.file
            ),
            DiagnosticKind::UnreadableFile { error } => {
                write!(f, "could not read {}: {}", self.file, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_file_and_entry() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::WrongFile {
                expected: "skyrimprefs.ini".to_string(),
            },
            "skyrim.ini",
        )
        .with_section("Display")
        .with_entry("bFull Screen", "1");

        assert_eq!(
            diagnostic.to_string(),
            "[Display] bFull Screen in wrong ini file (skyrim.ini, should be skyrimprefs.ini)"
        );
    }
}
