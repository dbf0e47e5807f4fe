//! Built-in game catalog.
//!
//! Maps a game's short name to the INI files it reads, in candidate order:
//! the main file first, then the prefs file, then any custom override.

use std::path::{Path, PathBuf};

use crate::caseless::eq_caseless;

const CATALOG: &[(&str, &[&str])] = &[
    ("oblivion", &["oblivion.ini", "oblivionprefs.ini"]),
    ("fallout3", &["fallout.ini", "falloutprefs.ini"]),
    ("falloutnv", &["fallout.ini", "falloutprefs.ini"]),
    (
        "fallout4",
        &["fallout4.ini", "fallout4prefs.ini", "fallout4custom.ini"],
    ),
    ("skyrim", &["skyrim.ini", "skyrimprefs.ini"]),
    ("skyrimse", &["skyrim.ini", "skyrimprefs.ini"]),
];

/// Candidate INI files for `game`, or an empty list for an unknown game.
pub fn candidate_files(game: &str) -> Vec<String> {
    CATALOG
        .iter()
        .find(|(name, _)| eq_caseless(name, game))
        .map(|(_, files)| files.iter().map(|f| f.to_string()).collect())
        .unwrap_or_default()
}

/// Whether `game` is in the built-in catalog.
pub fn is_known(game: &str) -> bool {
    CATALOG.iter().any(|(name, _)| eq_caseless(name, game))
}

/// Directory holding the INI files.
///
/// Profiles with local settings keep their own copies; otherwise the game's
/// folder under the user's documents is used.
pub fn resolve_base_dir(profile_dir: &Path, local_settings: bool, documents_dir: &Path) -> PathBuf {
    if local_settings {
        profile_dir.to_path_buf()
    } else {
        documents_dir.to_path_buf()
    }
}
