//! Merging on-disk values into the filtered schema.
//!
//! Each candidate file is read in order and every entry is checked against
//! the schema before its value is accepted. Entries the schema does not
//! expect produce diagnostics; values that fail to decode produce
//! user-facing [`CoercionError`]s. Neither stops the remaining entries or
//! files from being read.

use std::collections::HashSet;
use std::path::Path;

use crate::caseless::normalize;
use crate::coerce::{clamp_to_range, decode, CoercionError};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ini::{ConfigFile, RawEntry};
use crate::schema::{Schema, Value};

/// Outcome of reconciling a schema against its files.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Unexpected content, in the order found.
    pub diagnostics: Vec<Diagnostic>,
    /// Values that could not be decoded as their setting's type.
    pub invalid_values: Vec<CoercionError>,
    /// Candidate files that existed and were read.
    pub files_read: Vec<String>,
}

impl ReconcileReport {
    /// Whether any value needs the user's attention.
    pub fn has_invalid_values(&self) -> bool {
        !self.invalid_values.is_empty()
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }
}

/// Read every candidate file under `base_dir` and merge its values into
/// `schema`.
///
/// Missing files are skipped silently.
pub fn reconcile(schema: &mut Schema, base_dir: &Path, candidates: &[String]) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for file_name in candidates {
        let path = base_dir.join(file_name);
        match ConfigFile::read_existing(&path) {
            Ok(Some(file)) => {
                reconcile_file(schema, file_name, &file, &mut report);
                report.files_read.push(file_name.clone());
            }
            Ok(None) => {
                tracing::debug!("{} not found, keeping defaults", path.display());
            }
            Err(e) => report.push(Diagnostic::new(
                DiagnosticKind::UnreadableFile {
                    error: e.to_string(),
                },
                file_name.as_str(),
            )),
        }
    }

    tracing::info!(
        "Reconciled {} file(s): {} diagnostic(s), {} invalid value(s)",
        report.files_read.len(),
        report.diagnostics.len(),
        report.invalid_values.len()
    );
    report
}

/// Merge one already-parsed file into `schema`.
pub fn reconcile_file(
    schema: &mut Schema,
    file_name: &str,
    file: &ConfigFile,
    report: &mut ReconcileReport,
) {
    let mut unexpected = HashSet::new();
    for name in file.section_names() {
        if !schema.update_key(name) && unexpected.insert(normalize(name)) {
            report.push(
                Diagnostic::new(DiagnosticKind::UnexpectedSection, file_name).with_section(name),
            );
        }
    }

    for entry in file.raw_entries() {
        apply_entry(schema, file_name, entry, report);
    }
}

fn apply_entry(
    schema: &mut Schema,
    file_name: &str,
    entry: RawEntry<'_>,
    report: &mut ReconcileReport,
) {
    let Some(section_name) = entry.section else {
        report.push(
            Diagnostic::new(DiagnosticKind::EntryOutsideSection, file_name)
                .with_entry(entry.key, entry.value),
        );
        return;
    };
    // Unexpected sections were reported once above.
    let Some(section) = schema.get_mut(section_name) else {
        return;
    };

    let diagnostic = |kind| {
        Diagnostic::new(kind, file_name)
            .with_section(section_name)
            .with_entry(entry.key, entry.value)
    };

    let Some(setting) = section.get_mut(entry.key) else {
        report.push(diagnostic(DiagnosticKind::UnknownSetting));
        return;
    };

    if !setting.flags.both && !setting.targets(file_name) {
        let expected = setting.target_file.clone().unwrap_or_default();
        report.push(diagnostic(DiagnosticKind::WrongFile { expected }));
        return;
    }

    let mut value = match decode(entry.value, setting.value_type) {
        Ok(value) => value,
        Err(cause) => {
            let error = CoercionError {
                key: entry.key.to_string(),
                section: section_name.to_string(),
                file: file_name.to_string(),
                raw: entry.value.to_string(),
                cause,
            };
            tracing::warn!("{}", error);
            report.invalid_values.push(error);
            return;
        }
    };

    if let (Some(values), Value::Text(text)) = (&setting.enum_values, &value) {
        if !values.iter().any(|v| v == text) {
            report.push(diagnostic(DiagnosticKind::UnlistedEnumValue));
        }
    }
    if let Some(range) = setting.range {
        if !setting.in_range(&value) {
            value = clamp_to_range(value, range);
            report.push(diagnostic(DiagnosticKind::OutOfRange {
                clamped_to: value.clone(),
            }));
        }
    }

    setting.name = entry.key.to_string();
    setting.value = value.clone();
    if !setting.default_declared {
        setting.default = value.clone();
        setting.default_declared = true;
    }
    setting.saved = Some(value);
    section.update_key(entry.key);
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::schema::{filter_schema, load_schema_str};
    use tempfile::tempdir;

    const SCHEMA: &str = r#"{
        "display": {
            "iSize": { "default": 100, "range": { "lower": 0, "upper": 200 } },
            "bFull Screen": { "default": false, "flags": ["prefs"] },
            "fGamma": { "default": 1.0, "flags": ["both"] },
            "sQuality": { "default": "High", "values": ["Low", "High"] }
        },
        "General": {
            "sLanguage": {}
        }
    }"#;

    fn files() -> Vec<String> {
        vec!["main.ini".to_string(), "prefs.ini".to_string()]
    }

    fn session_schema() -> Schema {
        filter_schema(&load_schema_str(SCHEMA).unwrap(), "game", &files())
    }

    fn setting<'a>(schema: &'a Schema, section: &str, key: &str) -> &'a crate::schema::Setting {
        schema.get(section).unwrap().get(key).unwrap()
    }

    #[test]
    fn no_files_leaves_defaults_unsaved() {
        let dir = tempdir().unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert!(report.files_read.is_empty());
        assert!(report.diagnostics.is_empty());
        for section in schema.values() {
            for setting in section.values() {
                assert_eq!(setting.value, setting.default);
                assert!(setting.saved.is_none());
            }
        }
    }

    #[test]
    fn reads_values_and_adopts_file_casing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\nisize = 150\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert_eq!(report.files_read, vec!["main.ini".to_string()]);
        let size = setting(&schema, "DISPLAY", "iSize");
        assert_eq!(size.value, Value::Int(150));
        assert_eq!(size.saved, Some(Value::Int(150)));
        assert_eq!(size.name, "isize");
        assert!(schema.keys().any(|k| k == "Display"));
        assert!(schema.get("display").is_some());
        assert!(schema.get("Display").unwrap().keys().any(|k| k == "isize"));
    }

    #[test]
    fn invalid_value_keeps_default_and_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\niSize = abc\nsQuality=Low\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert_eq!(report.invalid_values.len(), 1);
        let error = &report.invalid_values[0];
        assert_eq!(error.key, "iSize");
        assert_eq!(error.raw, "abc");
        assert_eq!(error.file, "main.ini");
        assert_eq!(setting(&schema, "display", "iSize").value, Value::Int(100));
        assert!(setting(&schema, "display", "iSize").saved.is_none());
        assert_eq!(
            setting(&schema, "display", "sQuality").value,
            Value::Text("Low".to_string())
        );
    }

    #[test]
    fn wrong_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\nbFull Screen=1\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        let full_screen = setting(&schema, "display", "bFull Screen");
        assert_eq!(full_screen.value, Value::Bool(false));
        assert!(full_screen.saved.is_none());
        assert!(matches!(
            &report.diagnostics[0].kind,
            DiagnosticKind::WrongFile { expected } if expected == "prefs.ini"
        ));
    }

    #[test]
    fn both_flag_accepts_any_file_last_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\nfGamma=1.5\n").unwrap();
        fs::write(dir.path().join("prefs.ini"), "[Display]\nfGamma=2\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert!(report.diagnostics.is_empty());
        assert_eq!(setting(&schema, "display", "fGamma").value, Value::Float(2.0));
    }

    #[test]
    fn unexpected_and_unknown_entries_are_diagnosed() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("main.ini"),
            "stray=1\n[Mods]\na=1\nb=2\n[Display]\niMystery=3\n",
        )
        .unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        let kinds: Vec<&DiagnosticKind> = report.diagnostics.iter().map(|d| &d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &DiagnosticKind::UnexpectedSection,
                &DiagnosticKind::EntryOutsideSection,
                &DiagnosticKind::UnknownSetting,
            ]
        );
        assert!(!schema.contains_key("Mods"));
    }

    #[test]
    fn non_finite_float_is_an_invalid_value() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\nfGamma=nan\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert_eq!(report.invalid_values.len(), 1);
        assert_eq!(report.invalid_values[0].raw, "nan");
        let gamma = setting(&schema, "display", "fGamma");
        assert_eq!(gamma.value, Value::Float(1.0));
        assert!(!gamma.is_unsaved());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[Display]\niSize=999\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert_eq!(setting(&schema, "display", "iSize").value, Value::Int(200));
        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::OutOfRange { .. }
        ));
    }

    #[test]
    fn undeclared_default_comes_from_first_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.ini"), "[General]\nsLanguage=FRENCH\n").unwrap();
        let mut schema = session_schema();

        reconcile(&mut schema, dir.path(), &files());

        let language = setting(&schema, "General", "sLanguage");
        assert_eq!(language.default, Value::Text("FRENCH".to_string()));
        assert!(!language.is_unsaved());
    }

    #[test]
    fn unreadable_file_does_not_stop_the_next() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("main.ini")).unwrap();
        fs::write(dir.path().join("prefs.ini"), "[Display]\nbFull Screen=1\n").unwrap();
        let mut schema = session_schema();

        let report = reconcile(&mut schema, dir.path(), &files());

        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::UnreadableFile { .. }
        ));
        assert_eq!(
            setting(&schema, "display", "bFull Screen").value,
            Value::Bool(true)
        );
    }
}
