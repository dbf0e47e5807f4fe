//! Configurator Core - typed editing of game INI settings
//!
//! This crate loads a typed settings schema, reconciles it with a game's INI
//! files, validates edits and writes changed values back without disturbing
//! anything it does not understand. It has no UI dependencies.

pub mod caseless;
pub mod coerce;
pub mod config;
pub mod diagnostics;
pub mod edit;
pub mod games;
pub mod ini;
pub mod logging;
pub mod persist;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod view;

pub use edit::{Edit, EditError, EditValue};
pub use schema::{Schema, Section, Setting, Value, ValueType};
pub use session::{Session, SessionError, SessionInputs};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
