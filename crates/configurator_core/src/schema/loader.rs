//! Loading the static schema document.
//!
//! The document is JSON shaped as `section -> setting name -> attributes`:
//!
//! ```json
//! {
//!   "Display": {
//!     "iSize": { "default": 100, "range": { "lower": 0, "upper": 200 }, "flags": ["basic"] },
//!     "sMode": { "default": "Fast", "values": ["Fast", "Pretty"], "games": ["skyrim"] }
//!   }
//! }
//! ```
//!
//! Value types are derived here, once, and never re-inferred afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Range, Schema, Section, Setting, SettingFlag, Value, ValueType};
use crate::coerce::{clamp_to_range, decode_json, DecodeError};

/// Errors that make a schema document unusable.
///
/// Any of these prevents a session from starting.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read schema '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Section '{0}' is declared more than once")]
    DuplicateSection(String),

    #[error("Setting '{key}' is declared more than once in section '{section}'")]
    DuplicateSetting { section: String, key: String },

    #[error("Invalid default for [{section}] {key}: {source}")]
    InvalidDefault {
        section: String,
        key: String,
        #[source]
        source: DecodeError,
    },

    #[error("[{section}] {key} is a {value_type} setting and cannot have a range")]
    RangeOnNonNumeric {
        section: String,
        key: String,
        value_type: ValueType,
    },

    #[error("[{section}] {key} has an empty or inverted range {range}")]
    InvalidRange {
        section: String,
        key: String,
        range: Range,
    },

    #[error("Default {default} of [{section}] {key} is outside its range {range}")]
    DefaultOutOfRange {
        section: String,
        key: String,
        default: Value,
        range: Range,
    },

    #[error("Default {default} of [{section}] {key} is not one of its allowed values")]
    DefaultNotListed {
        section: String,
        key: String,
        default: Value,
    },
}

/// Result type for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// One setting as written in the schema document.
#[derive(Debug, Deserialize)]
struct SettingDocument {
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    flags: Vec<SettingFlag>,
    #[serde(default)]
    range: Option<Range>,
    #[serde(default)]
    step: Option<f64>,
    #[serde(default)]
    values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    games: Option<Vec<String>>,
    #[serde(default)]
    description: Option<String>,
}

type SchemaDocument = IndexMap<String, IndexMap<String, SettingDocument>>;

/// Load a schema document from disk.
pub fn load_schema_file(path: &Path) -> SchemaResult<Schema> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = load_schema_str(&content)?;
    tracing::debug!(
        "Loaded schema from {} ({} sections)",
        path.display(),
        schema.len()
    );
    Ok(schema)
}

/// Parse a schema document from JSON text.
pub fn load_schema_str(content: &str) -> SchemaResult<Schema> {
    let document: SchemaDocument = serde_json::from_str(content)?;

    let mut schema = Schema::new();
    for (section_name, settings) in document {
        if schema.contains_key(&section_name) {
            return Err(SchemaError::DuplicateSection(section_name));
        }

        let mut section = Section::new();
        for (key, doc) in settings {
            if section.contains_key(&key) {
                return Err(SchemaError::DuplicateSetting {
                    section: section_name,
                    key,
                });
            }
            let setting = build_setting(&section_name, key, doc)?;
            section.insert(setting.name.clone(), setting);
        }
        schema.insert(section_name, section);
    }

    Ok(schema)
}

fn build_setting(section: &str, key: String, doc: SettingDocument) -> SchemaResult<Setting> {
    let enum_values: Option<Vec<String>> = doc.values.map(|values| {
        values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    });
    let value_type = ValueType::derive(&key, enum_values.is_some());

    if let Some(range) = doc.range {
        if !value_type.is_numeric() {
            return Err(SchemaError::RangeOnNonNumeric {
                section: section.to_string(),
                key,
                value_type,
            });
        }
        if range.lower.is_nan() || range.upper.is_nan() || range.lower > range.upper {
            return Err(SchemaError::InvalidRange {
                section: section.to_string(),
                key,
                range,
            });
        }
    }

    let (default, default_declared) = match &doc.default {
        Some(json) if !json.is_null() => {
            let default =
                decode_json(json, value_type).map_err(|source| SchemaError::InvalidDefault {
                    section: section.to_string(),
                    key: key.clone(),
                    source,
                })?;
            (default, true)
        }
        _ => (implicit_default(value_type, doc.range, enum_values.as_deref()), false),
    };

    let mut setting = Setting::with_type(key, value_type, default);
    setting.default_declared = default_declared;
    setting.range = doc.range;
    setting.step = doc.step;
    setting.enum_values = enum_values;
    setting.flags = doc.flags.into_iter().collect();
    setting.games = doc.games;
    setting.description = doc.description;

    if let Some(range) = setting.range {
        if !setting.in_range(&setting.default) {
            return Err(SchemaError::DefaultOutOfRange {
                section: section.to_string(),
                key: setting.name.clone(),
                default: setting.default,
                range,
            });
        }
    }
    if let (Some(values), Value::Text(text)) = (&setting.enum_values, &setting.default) {
        if !values.iter().any(|v| v == text) {
            return Err(SchemaError::DefaultNotListed {
                section: section.to_string(),
                key: setting.name.clone(),
                default: setting.default.clone(),
            });
        }
    }

    Ok(setting)
}

/// Default for an entry that omits one: the first enum value, otherwise the
/// type's zero clamped into the range.
fn implicit_default(
    value_type: ValueType,
    range: Option<Range>,
    enum_values: Option<&[String]>,
) -> Value {
    if let Some(first) = enum_values.and_then(|values| values.first()) {
        return Value::Text(first.clone());
    }
    let zero = value_type.zero_value();
    match range {
        Some(range) => clamp_to_range(zero, range),
        None => zero,
    }
}
