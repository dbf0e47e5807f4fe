//! Host configuration for an editing session.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Defaults for every missing section and field
//! - Candidate files from the built-in game catalog when none are listed
//!
//! # Example
//!
//! ```no_run
//! use configurator_core::config::ConfigManager;
//! use configurator_core::session::Session;
//!
//! let config = ConfigManager::load("session.toml").unwrap().into_config();
//! let session = Session::from_config(&config).unwrap();
//! println!("{} unsaved", session.unsaved().len());
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{LoggingSettings, PathSettings, SessionConfig};
