//! What an editor shows in basic and advanced mode.

use crate::schema::{Schema, Section, Setting};

/// Sections to list, in schema order.
///
/// Advanced mode lists every section; basic mode only those holding at
/// least one `basic` setting.
pub fn sections_for_display(schema: &Schema, advanced: bool) -> Vec<(&str, &Section)> {
    schema
        .iter()
        .filter(|(_, section)| advanced || section.values().any(|s| s.flags.basic))
        .collect()
}

/// Settings of `section` to show, ordered by name ignoring the type prefix.
///
/// `hidden` settings are never shown; basic mode also drops settings not
/// flagged `basic`.
pub fn settings_for_display(section: &Section, advanced: bool) -> Vec<&Setting> {
    let mut settings: Vec<&Setting> = section
        .values()
        .filter(|s| !s.flags.hidden && (advanced || s.flags.basic))
        .collect();
    settings.sort_by(|a, b| display_key(&a.name).cmp(display_key(&b.name)));
    settings
}

/// Name without its first character.
fn display_key(name: &str) -> &str {
    name.char_indices()
        .nth(1)
        .map_or("", |(index, _)| &name[index..])
}
