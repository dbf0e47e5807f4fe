//! Conversion between raw INI text and typed setting values.
//!
//! Decoding is lenient where the games are lenient (booleans) and strict
//! elsewhere: a value that cannot be read as its declared type is reported,
//! never guessed.

use crate::schema::{Range, Rgb, Value, ValueType};

/// Why a raw string could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("'{raw}' is not a valid {expected}")]
    Invalid { raw: String, expected: ValueType },

    #[error("color '{0}' must have exactly three comma-separated components")]
    ColorArity(String),

    #[error("color component '{0}' is not in 0..=255")]
    ColorComponent(String),

    #[error("default of type {found} does not fit a {expected} setting")]
    DefaultType { found: String, expected: ValueType },
}

/// A value from a config file that could not be decoded.
///
/// Carries enough context to tell the user which line to fix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid value {key}={raw} in section [{section}] of {file}: {cause}")]
pub struct CoercionError {
    pub key: String,
    pub section: String,
    pub file: String,
    pub raw: String,
    #[source]
    pub cause: DecodeError,
}

impl CoercionError {
    /// Text suitable for a modal warning.
    pub fn user_message(&self) -> String {
        format!(
            "Your configuration file contains an invalid value: {}={} (in section {}).\n\
             The game will probably not report an error, it will just ignore this setting.",
            self.key, self.raw, self.section
        )
    }
}

/// Decode a raw INI value as `value_type`.
pub fn decode(raw: &str, value_type: ValueType) -> Result<Value, DecodeError> {
    let invalid = || DecodeError::Invalid {
        raw: raw.to_string(),
        expected: value_type,
    };

    match value_type {
        ValueType::Bool => Ok(Value::Bool(raw == "1")),
        ValueType::Int => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
        ValueType::UnsignedInt => raw
            .trim()
            .parse()
            .map(Value::UnsignedInt)
            .map_err(|_| invalid()),
        ValueType::Float => {
            let text = raw.trim();
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                Ok(_) => Err(invalid()),
                Err(_) => text
                    .parse::<i64>()
                    .map(|v| Value::Float(v as f64))
                    .map_err(|_| invalid()),
            }
        }
        ValueType::ColorRgb => decode_color(raw).map(Value::Color),
        ValueType::Enum | ValueType::String => Ok(Value::Text(raw.to_string())),
    }
}

fn decode_color(raw: &str) -> Result<Rgb, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(Rgb::default());
    }

    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err(DecodeError::ColorArity(raw.to_string()));
    }

    let mut channels = [0u8; 3];
    for (channel, part) in channels.iter_mut().zip(&parts) {
        let part = part.trim();
        let wide: i64 = part.parse().map_err(|_| DecodeError::Invalid {
            raw: raw.to_string(),
            expected: ValueType::ColorRgb,
        })?;
        *channel = u8::try_from(wide).map_err(|_| DecodeError::ColorComponent(part.to_string()))?;
    }

    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}

/// Canonical on-disk text of a value.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Int(v) => v.to_string(),
        Value::UnsignedInt(v) => v.to_string(),
        Value::Float(v) => encode_float(*v),
        Value::Color(rgb) => rgb.to_string(),
        Value::Text(text) => text.clone(),
    }
}

/// Floats always carry a decimal point so they read back as floats.
fn encode_float(v: f64) -> String {
    let text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Decode a default from the JSON schema document.
///
/// Numbers, booleans and strings are accepted wherever they make sense for
/// the type; strings go through [`decode`].
pub fn decode_json(json: &serde_json::Value, value_type: ValueType) -> Result<Value, DecodeError> {
    use serde_json::Value as Json;

    let mismatch = || DecodeError::DefaultType {
        found: json_kind(json).to_string(),
        expected: value_type,
    };

    match (value_type, json) {
        (_, Json::String(text)) => decode(text, value_type),
        (ValueType::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ValueType::Bool, Json::Number(n)) => Ok(Value::Bool(n.as_i64() == Some(1))),
        (ValueType::Int, Json::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(mismatch),
        (ValueType::UnsignedInt, Json::Number(n)) => {
            n.as_u64().map(Value::UnsignedInt).ok_or_else(mismatch)
        }
        (ValueType::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(mismatch),
        (ValueType::Enum | ValueType::String, Json::Number(_) | Json::Bool(_)) => {
            Ok(Value::Text(json.to_string()))
        }
        _ => Err(mismatch()),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Clamp a numeric value into `range`, keeping its variant.
///
/// Non-numeric values are returned unchanged.
pub fn clamp_to_range(value: Value, range: Range) -> Value {
    match value {
        Value::Int(v) => {
            let lower = range.lower.ceil() as i64;
            let upper = range.upper.floor() as i64;
            Value::Int(v.clamp(lower, upper.max(lower)))
        }
        Value::UnsignedInt(v) => {
            let lower = range.lower.max(0.0).ceil() as u64;
            let upper = range.upper.max(0.0).floor() as u64;
            Value::UnsignedInt(v.clamp(lower, upper.max(lower)))
        }
        Value::Float(v) => Value::Float(v.clamp(range.lower, range.upper)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_is_two_valued() {
        assert_eq!(decode("1", ValueType::Bool), Ok(Value::Bool(true)));
        for raw in ["0", "yes", "", "2", "true"] {
            assert_eq!(decode(raw, ValueType::Bool), Ok(Value::Bool(false)), "{raw:?}");
        }
    }

    #[test]
    fn float_rejects_non_finite() {
        for raw in ["nan", "NaN", "inf", "-infinity", "1e400"] {
            assert!(
                matches!(decode(raw, ValueType::Float), Err(DecodeError::Invalid { .. })),
                "{raw:?}"
            );
        }
        assert_eq!(decode("1e3", ValueType::Float), Ok(Value::Float(1000.0)));
    }

    #[test]
    fn int_rejects_non_numeric() {
        assert_eq!(decode("150", ValueType::Int), Ok(Value::Int(150)));
        assert_eq!(decode("-3", ValueType::Int), Ok(Value::Int(-3)));
        assert!(matches!(
            decode("abc", ValueType::Int),
            Err(DecodeError::Invalid { .. })
        ));
        assert!(decode("1.5", ValueType::Int).is_err());
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert_eq!(
            decode("4294967295", ValueType::UnsignedInt),
            Ok(Value::UnsignedInt(4_294_967_295))
        );
        assert!(decode("-1", ValueType::UnsignedInt).is_err());
    }

    #[test]
    fn float_accepts_decimals_and_integers() {
        assert_eq!(decode("0.75", ValueType::Float), Ok(Value::Float(0.75)));
        assert_eq!(decode("3", ValueType::Float), Ok(Value::Float(3.0)));
        assert!(decode("fast", ValueType::Float).is_err());
    }

    #[test]
    fn color_triplet() {
        assert_eq!(
            decode("255, 128,0", ValueType::ColorRgb),
            Ok(Value::Color(Rgb::new(255, 128, 0)))
        );
        assert_eq!(decode("", ValueType::ColorRgb), Ok(Value::Color(Rgb::default())));
        assert!(matches!(
            decode("1,2", ValueType::ColorRgb),
            Err(DecodeError::ColorArity(_))
        ));
        assert!(matches!(
            decode("1,2,300", ValueType::ColorRgb),
            Err(DecodeError::ColorComponent(_))
        ));
        assert!(decode("a,b,c", ValueType::ColorRgb).is_err());
    }

    #[test]
    fn text_is_unmodified() {
        assert_eq!(
            decode("  Spaced Out ", ValueType::String),
            Ok(Value::Text("  Spaced Out ".to_string()))
        );
    }

    #[test]
    fn encode_canonical_forms() {
        assert_eq!(encode(&Value::Bool(true)), "1");
        assert_eq!(encode(&Value::Bool(false)), "0");
        assert_eq!(encode(&Value::Int(-7)), "-7");
        assert_eq!(encode(&Value::Float(2.0)), "2.0");
        assert_eq!(encode(&Value::Float(0.25)), "0.25");
        assert_eq!(encode(&Value::Color(Rgb::new(1, 2, 3))), "1,2,3");
    }

    #[test]
    fn encoded_values_decode_back() {
        let cases = [
            (Value::Bool(true), ValueType::Bool),
            (Value::Int(i64::MIN), ValueType::Int),
            (Value::UnsignedInt(u64::MAX), ValueType::UnsignedInt),
            (Value::Float(1e-3), ValueType::Float),
            (Value::Float(123456789.0), ValueType::Float),
            (Value::Color(Rgb::new(0, 255, 17)), ValueType::ColorRgb),
            (Value::Text("Mode A".to_string()), ValueType::Enum),
        ];
        for (value, value_type) in cases {
            assert_eq!(decode(&encode(&value), value_type), Ok(value));
        }
    }

    #[test]
    fn json_defaults() {
        use serde_json::json;

        assert_eq!(decode_json(&json!(true), ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(decode_json(&json!(1), ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(decode_json(&json!(100), ValueType::Int), Ok(Value::Int(100)));
        assert_eq!(decode_json(&json!(2), ValueType::Float), Ok(Value::Float(2.0)));
        assert_eq!(
            decode_json(&json!("10,20,30"), ValueType::ColorRgb),
            Ok(Value::Color(Rgb::new(10, 20, 30)))
        );
        assert_eq!(
            decode_json(&json!(5), ValueType::String),
            Ok(Value::Text("5".to_string()))
        );
        assert!(decode_json(&json!(-1), ValueType::UnsignedInt).is_err());
        assert!(decode_json(&json!([1]), ValueType::Int).is_err());
    }

    #[test]
    fn clamp_keeps_variant() {
        let range = Range::new(0.0, 200.0);
        assert_eq!(clamp_to_range(Value::Int(250), range), Value::Int(200));
        assert_eq!(clamp_to_range(Value::Float(-1.0), range), Value::Float(0.0));
        assert_eq!(
            clamp_to_range(Value::UnsignedInt(5), Range::new(10.0, 20.0)),
            Value::UnsignedInt(10)
        );
        assert_eq!(
            clamp_to_range(Value::Bool(true), range),
            Value::Bool(true)
        );
    }

    #[test]
    fn user_message_names_key_and_section() {
        let err = CoercionError {
            key: "iSize".to_string(),
            section: "Display".to_string(),
            file: "main.ini".to_string(),
            raw: "abc".to_string(),
            cause: DecodeError::Invalid {
                raw: "abc".to_string(),
                expected: ValueType::Int,
            },
        };
        let message = err.user_message();
        assert!(message.contains("iSize=abc"));
        assert!(message.contains("Display"));
    }
}
