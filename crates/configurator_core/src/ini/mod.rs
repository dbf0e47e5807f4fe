//! INI-style config file reading and writing.
//!
//! This module provides:
//! - A line-preserving parser for `[Section]` / `key = value` files
//! - Inline `//` comment stripping for values handed to the reconciler
//! - In-place value updates that leave every other line untouched
//! - Atomic writes (write to temp file, then rename)

mod file;
mod line;

use std::io;
use std::path::PathBuf;

pub use file::{ConfigFile, IniSection, RawEntry};
pub use line::{Line, PairLine};

/// Errors that can occur while reading or writing a config file.
#[derive(Debug, thiserror::Error)]
pub enum IniError {
    #[error("Failed to read config file '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write config file '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Result type for config file operations.
pub type IniResult<T> = Result<T, IniError>;
