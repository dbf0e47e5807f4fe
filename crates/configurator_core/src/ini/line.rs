//! Single-line classification.

/// A `key = value` line split so the value can be replaced without
/// disturbing spacing or a trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairLine {
    /// Key with surrounding whitespace removed.
    pub key: String,
    /// Everything up to the start of the value (key, `=`, spacing).
    prefix: String,
    /// The value, without inline comment or surrounding whitespace.
    value: String,
    /// Whitespace and `//` comment after the value.
    suffix: String,
}

impl PairLine {
    /// Build a fresh `key=value` line.
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            prefix: format!("{}=", key),
            value: value.to_string(),
            suffix: String::new(),
        }
    }

    /// Split a line at its first `=`. Returns `None` if there is no `=` or
    /// the key is empty.
    pub fn parse(text: &str) -> Option<Self> {
        let eq = text.find('=')?;
        let key = text[..eq].trim();
        if key.is_empty() {
            return None;
        }

        let rest = &text[eq + 1..];
        let leading = rest.len() - rest.trim_start().len();
        let prefix = text[..eq + 1 + leading].to_string();
        let body = &rest[leading..];

        let value_end = body.find("//").unwrap_or(body.len());
        let value = body[..value_end].trim_end();
        let suffix = &body[value.len()..];

        Some(Self {
            key: key.to_string(),
            prefix,
            value: value.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// The value with any inline comment stripped.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, keeping spacing and comment.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// The full line text.
    pub fn text(&self) -> String {
        format!("{}{}{}", self.prefix, self.value, self.suffix)
    }
}

/// One physical line of a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Pair(PairLine),
    /// Full-line `;` or `#` comment, kept verbatim.
    Comment(String),
    /// Whitespace-only line, kept verbatim.
    Blank(String),
    /// Anything the parser does not understand, kept verbatim.
    Opaque(String),
}

impl Line {
    /// Classify a non-header line.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Line::Blank(text.to_string())
        } else if trimmed.starts_with(';') || trimmed.starts_with('#') {
            Line::Comment(text.to_string())
        } else if let Some(pair) = PairLine::parse(text) {
            Line::Pair(pair)
        } else {
            Line::Opaque(text.to_string())
        }
    }

    /// The line's text as it will be written.
    pub fn text(&self) -> String {
        match self {
            Line::Pair(pair) => pair.text(),
            Line::Comment(text) | Line::Blank(text) | Line::Opaque(text) => text.clone(),
        }
    }

    pub fn as_pair(&self) -> Option<&PairLine> {
        match self {
            Line::Pair(pair) => Some(pair),
            _ => None,
        }
    }
}

/// Section name of a `[Name]` header line, if it is one.
///
/// The name ends at the first `]`; anything after it (usually a comment)
/// stays in the header text.
pub(crate) fn parse_header(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(rest[..end].trim())
}
