//! Typed settings schema.
//!
//! This module provides:
//! - The schema model (sections of typed settings)
//! - Loading the static schema document
//! - Filtering it down to a per-session schema for one game

mod filter;
mod loader;
mod types;

pub use filter::filter_schema;
pub use loader::{load_schema_file, load_schema_str, SchemaError, SchemaResult};
pub use types::{
    Range, Rgb, Schema, Section, Setting, SettingFlag, SettingFlags, Value, ValueType,
};
