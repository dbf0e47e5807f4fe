//! Applying editor changes to the session schema.
//!
//! The editor never writes into settings directly. It submits a batch of
//! [`Edit`]s; the whole batch is validated against each setting's type,
//! range and allowed values first, and applied only if every edit is valid.

use crate::coerce::{decode, DecodeError};
use crate::schema::{Range, Schema, Setting, Value, ValueType};

/// New value requested for one setting.
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    /// A typed value, e.g. from a checkbox or slider.
    Typed(Value),
    /// Text to decode with the setting's type, e.g. from a line edit.
    Text(String),
    /// Restore the setting's default.
    ResetToDefault,
}

/// One requested change.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub section: String,
    pub key: String,
    pub value: EditValue,
}

impl Edit {
    pub fn new(section: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: EditValue::Typed(value),
        }
    }

    pub fn from_text(
        section: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: EditValue::Text(text.into()),
        }
    }

    pub fn reset(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: EditValue::ResetToDefault,
        }
    }
}

/// Why an edit was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Unknown section '{0}'")]
    UnknownSection(String),

    #[error("Unknown setting [{section}] {key}")]
    UnknownSetting { section: String, key: String },

    #[error("[{section}] {key} expects a {expected} value, got {found:?}")]
    TypeMismatch {
        section: String,
        key: String,
        expected: ValueType,
        found: Value,
    },

    #[error("[{section}] {key}: {source}")]
    Decode {
        section: String,
        key: String,
        #[source]
        source: DecodeError,
    },

    #[error("[{section}] {key}: {value} is outside {range}")]
    OutOfRange {
        section: String,
        key: String,
        value: Value,
        range: Range,
    },

    #[error("[{section}] {key}: {value} is not a finite number")]
    NotFinite {
        section: String,
        key: String,
        value: f64,
    },

    #[error("[{section}] {key}: '{value}' cannot be stored in an ini file: {reason}")]
    Unstorable {
        section: String,
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("[{section}] {key}: '{value}' is not an allowed value")]
    NotListed {
        section: String,
        key: String,
        value: String,
    },
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Validate and apply a batch of edits.
///
/// Either every edit is applied or none is. Later edits to the same setting
/// win. Returns the number of settings whose value actually changed.
pub fn apply_edits(schema: &mut Schema, edits: &[Edit]) -> EditResult<usize> {
    let mut accepted = Vec::with_capacity(edits.len());
    for edit in edits {
        let setting = lookup(schema, &edit.section, &edit.key)?;
        accepted.push(validate(setting, &edit.section, &edit.value)?);
    }

    let mut changed = 0;
    for (edit, value) in edits.iter().zip(accepted) {
        if let Some(setting) = schema
            .get_mut(&edit.section)
            .and_then(|section| section.get_mut(&edit.key))
        {
            if setting.value != value {
                tracing::debug!(
                    "[{}] {}: {} -> {}",
                    edit.section,
                    setting.name,
                    setting.value,
                    value
                );
                setting.value = value;
                changed += 1;
            }
        }
    }
    Ok(changed)
}

fn lookup<'a>(schema: &'a Schema, section: &str, key: &str) -> EditResult<&'a Setting> {
    schema
        .get(section)
        .ok_or_else(|| EditError::UnknownSection(section.to_string()))?
        .get(key)
        .ok_or_else(|| EditError::UnknownSetting {
            section: section.to_string(),
            key: key.to_string(),
        })
}

/// Check a requested value against a setting, returning the value to store.
pub fn validate(setting: &Setting, section: &str, requested: &EditValue) -> EditResult<Value> {
    let value = match requested {
        EditValue::ResetToDefault => return Ok(setting.default.clone()),
        EditValue::Text(text) => {
            decode(text, setting.value_type).map_err(|source| EditError::Decode {
                section: section.to_string(),
                key: setting.name.clone(),
                source,
            })?
        }
        EditValue::Typed(value) => {
            convert(value.clone(), setting.value_type).ok_or_else(|| EditError::TypeMismatch {
                section: section.to_string(),
                key: setting.name.clone(),
                expected: setting.value_type,
                found: value.clone(),
            })?
        }
    };

    match &value {
        Value::Float(v) if !v.is_finite() => {
            return Err(EditError::NotFinite {
                section: section.to_string(),
                key: setting.name.clone(),
                value: *v,
            });
        }
        Value::Text(text) => {
            if let Some(reason) = unstorable_reason(text) {
                return Err(EditError::Unstorable {
                    section: section.to_string(),
                    key: setting.name.clone(),
                    value: text.clone(),
                    reason,
                });
            }
        }
        _ => {}
    }

    if let Some(range) = setting.range {
        if !setting.in_range(&value) {
            return Err(EditError::OutOfRange {
                section: section.to_string(),
                key: setting.name.clone(),
                value,
                range,
            });
        }
    }

    if let (Some(values), Value::Text(text)) = (&setting.enum_values, &value) {
        if !values.iter().any(|v| v == text) {
            return Err(EditError::NotListed {
                section: section.to_string(),
                key: setting.name.clone(),
                value: text.clone(),
            });
        }
    }

    Ok(value)
}

/// Why `text` would not read back unchanged from an ini line, if it would not.
fn unstorable_reason(text: &str) -> Option<&'static str> {
    if text.contains(['\r', '\n']) {
        Some("line breaks are not allowed")
    } else if text.contains("//") {
        Some("'//' starts a comment")
    } else if text.trim() != text {
        Some("leading or trailing whitespace is dropped")
    } else {
        None
    }
}

/// Lossless conversions between numeric variants; everything else must
/// already match.
fn convert(value: Value, value_type: ValueType) -> Option<Value> {
    if value.matches_type(value_type) {
        return Some(value);
    }
    match (value, value_type) {
        (Value::Int(v), ValueType::Float) => Some(Value::Float(v as f64)),
        (Value::UnsignedInt(v), ValueType::Float) => Some(Value::Float(v as f64)),
        (Value::Int(v), ValueType::UnsignedInt) => u64::try_from(v).ok().map(Value::UnsignedInt),
        (Value::UnsignedInt(v), ValueType::Int) => i64::try_from(v).ok().map(Value::Int),
        _ => None,
    }
}
