//! Schema model: settings, sections and their typed values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::caseless::{eq_caseless, CaselessMap};

/// Declared type of a setting, fixed when the schema is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    UnsignedInt,
    Float,
    ColorRgb,
    Enum,
    String,
}

impl ValueType {
    /// Derive the type from a setting name and whether it declares an
    /// enum value list.
    ///
    /// An enum list wins over the name prefix. Prefixes are matched
    /// case-sensitively: `b`, `i`, `u`, `f`, `r`.
    pub fn derive(name: &str, has_enum_values: bool) -> Self {
        if has_enum_values {
            return ValueType::Enum;
        }
        match name.chars().next() {
            Some('b') => ValueType::Bool,
            Some('i') => ValueType::Int,
            Some('u') => ValueType::UnsignedInt,
            Some('f') => ValueType::Float,
            Some('r') => ValueType::ColorRgb,
            _ => ValueType::String,
        }
    }

    /// Whether values of this type can carry a numeric range.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Int | ValueType::UnsignedInt | ValueType::Float
        )
    }

    /// The value used when a schema entry omits its default.
    pub fn zero_value(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::UnsignedInt => Value::UnsignedInt(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::ColorRgb => Value::Color(Rgb::default()),
            ValueType::Enum | ValueType::String => Value::Text(String::new()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::UnsignedInt => write!(f, "unsigned int"),
            ValueType::Float => write!(f, "float"),
            ValueType::ColorRgb => write!(f, "rgb color"),
            ValueType::Enum => write!(f, "enum"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// An RGB color triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// A typed setting value.
///
/// `Enum` and `String` settings both hold [`Value::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UnsignedInt(u64),
    Float(f64),
    Color(Rgb),
    Text(String),
}

impl Value {
    /// Numeric view used for range checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UnsignedInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this value can be stored in a setting of type `value_type`.
    pub fn matches_type(&self, value_type: ValueType) -> bool {
        matches!(
            (self, value_type),
            (Value::Bool(_), ValueType::Bool)
                | (Value::Int(_), ValueType::Int)
                | (Value::UnsignedInt(_), ValueType::UnsignedInt)
                | (Value::Float(_), ValueType::Float)
                | (Value::Color(_), ValueType::ColorRgb)
                | (Value::Text(_), ValueType::Enum | ValueType::String)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UnsignedInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Color(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

impl Range {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Whether a numeric value lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// A tag attached to a setting in the schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingFlag {
    /// Shown in basic (non-advanced) mode.
    Basic,
    /// Never shown.
    Hidden,
    /// Lives in the preferences file.
    Prefs,
    /// May appear in any candidate file.
    Both,
    /// Unrecognised flag words are carried but have no effect.
    #[serde(other)]
    Unknown,
}

/// Set of [`SettingFlag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingFlags {
    pub basic: bool,
    pub hidden: bool,
    pub prefs: bool,
    pub both: bool,
}

impl SettingFlags {
    pub fn has(&self, flag: SettingFlag) -> bool {
        match flag {
            SettingFlag::Basic => self.basic,
            SettingFlag::Hidden => self.hidden,
            SettingFlag::Prefs => self.prefs,
            SettingFlag::Both => self.both,
            SettingFlag::Unknown => false,
        }
    }
}

impl FromIterator<SettingFlag> for SettingFlags {
    fn from_iter<I: IntoIterator<Item = SettingFlag>>(iter: I) -> Self {
        let mut flags = SettingFlags::default();
        for flag in iter {
            match flag {
                SettingFlag::Basic => flags.basic = true,
                SettingFlag::Hidden => flags.hidden = true,
                SettingFlag::Prefs => flags.prefs = true,
                SettingFlag::Both => flags.both = true,
                SettingFlag::Unknown => {}
            }
        }
        flags
    }
}

/// A single named, typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    /// Setting name as declared (or as last seen in a file).
    pub name: String,
    /// Type derived at load time.
    pub value_type: ValueType,
    /// Default value.
    pub default: Value,
    /// Whether the schema document declared the default explicitly.
    pub default_declared: bool,
    /// Current, editable value.
    pub value: Value,
    /// Last value known to be on disk. `None` if never observed.
    pub saved: Option<Value>,
    /// Inclusive bounds for numeric settings.
    pub range: Option<Range>,
    /// Editor increment hint.
    pub step: Option<f64>,
    /// Allowed literals for enum settings.
    pub enum_values: Option<Vec<String>>,
    pub flags: SettingFlags,
    /// Games this setting applies to. `None` means all games.
    pub games: Option<Vec<String>>,
    /// File this setting is read from and written to, assigned by filtering.
    pub target_file: Option<String>,
    pub description: Option<String>,
}

impl Setting {
    /// Create a setting whose type is derived from its name.
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        let name = name.into();
        let value_type = ValueType::derive(&name, false);
        Self::with_type(name, value_type, default)
    }

    /// Create a setting with an explicit type.
    pub fn with_type(name: impl Into<String>, value_type: ValueType, default: Value) -> Self {
        Self {
            name: name.into(),
            value_type,
            value: default.clone(),
            default,
            default_declared: true,
            saved: None,
            range: None,
            step: None,
            enum_values: None,
            flags: SettingFlags::default(),
            games: None,
            target_file: None,
            description: None,
        }
    }

    /// Last on-disk value, or the default if the setting was never seen.
    pub fn effective_saved(&self) -> &Value {
        self.saved.as_ref().unwrap_or(&self.default)
    }

    /// Whether `value` differs from what is on disk.
    pub fn is_unsaved(&self) -> bool {
        self.value != *self.effective_saved()
    }

    /// Whether this setting applies to `game` (case-insensitive).
    pub fn applies_to(&self, game: &str) -> bool {
        match &self.games {
            Some(games) => games.iter().any(|g| eq_caseless(g, game)),
            None => true,
        }
    }

    /// Whether `value` lies within the setting's range, if it has one.
    pub fn in_range(&self, value: &Value) -> bool {
        match (self.range, value.as_f64()) {
            (Some(range), Some(v)) => range.contains(v),
            _ => true,
        }
    }

    /// Whether `file` is this setting's target file (case-insensitive).
    pub fn targets(&self, file: &str) -> bool {
        self.target_file
            .as_deref()
            .is_some_and(|target| eq_caseless(target, file))
    }
}

/// Settings of one section, keyed case-insensitively by name.
pub type Section = CaselessMap<Setting>;

/// All sections of an editing session.
pub type Schema = CaselessMap<Section>;
