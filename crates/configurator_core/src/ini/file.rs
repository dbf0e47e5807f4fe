//! Whole-file model: preamble plus ordered sections of lines.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::line::{parse_header, Line, PairLine};
use super::{IniError, IniResult};
use crate::caseless::eq_caseless;

const BOM: char = '\u{feff}';

/// A `[Name]` block and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    /// Section name as written between the brackets.
    pub name: String,
    /// Header line text as it appeared in the file.
    header: String,
    pub lines: Vec<Line>,
}

impl IniSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            header: format!("[{}]", name),
            lines: Vec::new(),
        }
    }

    fn pair_mut(&mut self, key: &str) -> Option<&mut PairLine> {
        self.lines.iter_mut().rev().find_map(|line| match line {
            Line::Pair(pair) if eq_caseless(&pair.key, key) => Some(pair),
            _ => None,
        })
    }

    /// Insert after the last non-blank line so trailing blank lines stay
    /// trailing.
    fn push_pair(&mut self, pair: PairLine) {
        let at = self
            .lines
            .iter()
            .rposition(|line| !matches!(line, Line::Blank(_)))
            .map_or(0, |i| i + 1);
        self.lines.insert(at, Line::Pair(pair));
    }
}

/// One `key = value` entry as seen by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
    /// Enclosing section, or `None` for entries before the first header.
    pub section: Option<&'a str>,
    pub key: &'a str,
    /// Value with inline comment stripped and whitespace trimmed.
    pub value: &'a str,
}

/// A parsed config file that writes back byte-for-byte apart from the
/// values explicitly changed through [`ConfigFile::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Lines before the first section header.
    pub preamble: Vec<Line>,
    pub sections: Vec<IniSection>,
    crlf: bool,
    trailing_newline: bool,
    bom: bool,
}

impl ConfigFile {
    /// Create an empty file.
    pub fn new() -> Self {
        Self {
            trailing_newline: true,
            ..Self::default()
        }
    }

    /// Parse file content.
    pub fn parse(content: &str) -> Self {
        let mut file = ConfigFile::new();
        if content.is_empty() {
            return file;
        }

        let content = match content.strip_prefix(BOM) {
            Some(rest) => {
                file.bom = true;
                rest
            }
            None => content,
        };
        file.crlf = content.contains("\r\n");
        file.trailing_newline = content.ends_with('\n');

        let body = content.strip_suffix('\n').unwrap_or(content);
        let mut current: Option<IniSection> = None;
        for raw in body.split('\n') {
            let text = raw.strip_suffix('\r').unwrap_or(raw);

            if let Some(name) = parse_header(text) {
                if let Some(section) = current.take() {
                    file.sections.push(section);
                }
                current = Some(IniSection {
                    name: name.to_string(),
                    header: text.to_string(),
                    lines: Vec::new(),
                });
                continue;
            }

            let line = Line::parse(text);
            match current.as_mut() {
                Some(section) => section.lines.push(line),
                None => file.preamble.push(line),
            }
        }
        if let Some(section) = current {
            file.sections.push(section);
        }

        file
    }

    /// Read a file if it exists.
    ///
    /// Returns `Ok(None)` when the path does not exist.
    pub fn read_existing(path: &Path) -> IniResult<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(IniError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Read a file, treating a missing file as empty.
    pub fn read(path: &Path) -> IniResult<Self> {
        match Self::read_existing(path)? {
            Some(file) => Ok(file),
            None => {
                tracing::debug!(
                    "Config file {} does not exist, treating as empty",
                    path.display()
                );
                Ok(Self::new())
            }
        }
    }

    /// All key/value entries in file order.
    ///
    /// Duplicate keys are all reported; later ones should win.
    pub fn raw_entries(&self) -> Vec<RawEntry<'_>> {
        let preamble = self
            .preamble
            .iter()
            .filter_map(Line::as_pair)
            .map(|pair| RawEntry {
                section: None,
                key: &pair.key,
                value: pair.value(),
            });
        let sections = self.sections.iter().flat_map(|section| {
            section.lines.iter().filter_map(Line::as_pair).map(|pair| RawEntry {
                section: Some(section.name.as_str()),
                key: &pair.key,
                value: pair.value(),
            })
        });
        preamble.chain(sections).collect()
    }

    /// Names of all sections in file order, duplicates included.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Whether a section exists, ignoring case.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| eq_caseless(&s.name, name))
    }

    /// The effective (last) value of `key` in `section`, ignoring case.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .filter(|s| eq_caseless(&s.name, section))
            .flat_map(|s| s.lines.iter().filter_map(Line::as_pair))
            .filter(|pair| eq_caseless(&pair.key, key))
            .last()
            .map(PairLine::value)
    }

    /// Set `key` in `section` to `value`.
    ///
    /// The last existing occurrence of the key has its value replaced in
    /// place. Otherwise the key is appended to the last block of the
    /// section, and the section is appended to the file if missing.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let existing = self
            .sections
            .iter_mut()
            .rev()
            .filter(|s| eq_caseless(&s.name, section))
            .find_map(|s| s.pair_mut(key));
        if let Some(pair) = existing {
            pair.set_value(value);
            return;
        }

        let pair = PairLine::new(key, value);
        if let Some(target) = self
            .sections
            .iter_mut()
            .rev()
            .find(|s| eq_caseless(&s.name, section))
        {
            target.push_pair(pair);
            return;
        }

        let ends_blank = self
            .sections
            .last()
            .map(|s| s.lines.last())
            .unwrap_or_else(|| self.preamble.last())
            .map_or(true, |line| matches!(line, Line::Blank(_)));
        if !ends_blank {
            let separator = Line::Blank(String::new());
            match self.sections.last_mut() {
                Some(last) => last.lines.push(separator),
                None => self.preamble.push(separator),
            }
        }

        let mut new_section = IniSection::new(section);
        new_section.lines.push(Line::Pair(pair));
        self.sections.push(new_section);
    }

    /// Serialize back to text with the original line endings.
    pub fn to_text(&self) -> String {
        let newline = if self.crlf { "\r\n" } else { "\n" };

        let mut lines: Vec<String> = Vec::new();
        lines.extend(self.preamble.iter().map(Line::text));
        for section in &self.sections {
            lines.push(section.header.clone());
            lines.extend(section.lines.iter().map(Line::text));
        }

        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        out.push_str(&lines.join(newline));
        if self.trailing_newline && !lines.is_empty() {
            out.push_str(newline);
        }
        out
    }

    /// Write the file atomically.
    ///
    /// Writes to a temp file next to `path` first, then renames it over
    /// `path`.
    pub fn write_atomic(&self, path: &Path) -> IniResult<()> {
        let write_err = |source| IniError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let result = (|| {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(self.to_text().as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
        Ok(())
    }
}
