//! Per-session schema filtering.
//!
//! Narrows the static schema to the active game and decides which candidate
//! file each setting lives in.

use super::types::{Schema, Section};

/// Derive the session schema for `game` from the static `schema`.
///
/// `candidates` is the ordered list of file names for the game: the main
/// file first, the preferences file second. Settings flagged `prefs` target
/// the second file (or the first when there is only one), all others target
/// the first. Every retained setting starts at its default; sections left
/// empty are dropped. With no candidates the result is empty.
pub fn filter_schema(schema: &Schema, game: &str, candidates: &[String]) -> Schema {
    let Some(main_file) = candidates.first() else {
        tracing::debug!("No candidate files for game '{}', schema is empty", game);
        return Schema::new();
    };
    let prefs_file = candidates.get(1).unwrap_or(main_file);

    let mut filtered = Schema::new();
    for (section_name, section) in schema.iter() {
        let mut kept = Section::new();
        for (key, setting) in section.iter() {
            if !setting.applies_to(game) {
                continue;
            }
            let mut setting = setting.clone();
            setting.target_file = Some(if setting.flags.prefs {
                prefs_file.clone()
            } else {
                main_file.clone()
            });
            setting.value = setting.default.clone();
            kept.insert(key, setting);
        }
        if !kept.is_empty() {
            filtered.insert(section_name, kept);
        }
    }

    tracing::debug!(
        "Filtered schema for '{}': {} of {} sections kept",
        game,
        filtered.len(),
        schema.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_schema_str;

    const SAMPLE: &str = r#"{
        "Display": {
            "iSize": { "default": 100 },
            "bFull Screen": { "default": true, "flags": ["prefs"] }
        },
        "Papyrus": {
            "bEnableLogging": { "default": false, "games": ["Skyrim", "SkyrimSE"] }
        },
        "Fallout": {
            "sPipboy": { "default": "on", "games": ["Fallout4"] }
        }
    }"#;

    fn files() -> Vec<String> {
        vec!["skyrim.ini".to_string(), "skyrimprefs.ini".to_string()]
    }

    #[test]
    fn assigns_target_files_by_prefs_flag() {
        let schema = load_schema_str(SAMPLE).unwrap();
        let filtered = filter_schema(&schema, "Skyrim", &files());

        let display = filtered.get("Display").unwrap();
        assert_eq!(
            display.get("iSize").unwrap().target_file.as_deref(),
            Some("skyrim.ini")
        );
        assert_eq!(
            display.get("bFull Screen").unwrap().target_file.as_deref(),
            Some("skyrimprefs.ini")
        );
    }

    #[test]
    fn drops_other_games_and_empty_sections() {
        let schema = load_schema_str(SAMPLE).unwrap();
        let filtered = filter_schema(&schema, "skyrimse", &files());

        assert!(filtered.contains_key("Papyrus"));
        assert!(!filtered.contains_key("Fallout"));
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["Display", "Papyrus"]);
    }

    #[test]
    fn no_candidates_yields_empty_schema() {
        let schema = load_schema_str(SAMPLE).unwrap();
        assert!(filter_schema(&schema, "Skyrim", &[]).is_empty());
    }

    #[test]
    fn prefs_fall_back_to_single_candidate() {
        let schema = load_schema_str(SAMPLE).unwrap();
        let filtered = filter_schema(&schema, "Skyrim", &["only.ini".to_string()]);
        let setting = filtered.get("Display").unwrap().get("bFull Screen").unwrap();
        assert_eq!(setting.target_file.as_deref(), Some("only.ini"));
    }

    #[test]
    fn values_start_at_default() {
        let mut schema = load_schema_str(SAMPLE).unwrap();
        if let Some(setting) = schema.get_mut("Display").and_then(|s| s.get_mut("iSize")) {
            setting.value = crate::schema::Value::Int(5);
        }
        let filtered = filter_schema(&schema, "Skyrim", &files());
        let setting = filtered.get("Display").unwrap().get("iSize").unwrap();
        assert_eq!(setting.value, setting.default);
    }
}
