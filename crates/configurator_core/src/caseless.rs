//! Ordered, case-preserving map with case-insensitive lookup.
//!
//! Game INI files treat section and key names case-insensitively, but the
//! casing a file uses should be kept when the file is written back. Entries
//! are stored under their lowercase form; the casing last supplied through
//! [`CaselessMap::insert`] or [`CaselessMap::update_key`] is what iteration
//! reports.

use indexmap::IndexMap;

/// Map keyed case-insensitively, iterating in insertion order with the
/// original key casing.
#[derive(Debug, Clone, PartialEq)]
pub struct CaselessMap<V> {
    /// Values keyed by normalized (lowercase) key.
    entries: IndexMap<String, V>,
    /// Original casing, keyed by normalized key.
    casing: IndexMap<String, String>,
}

impl<V> Default for CaselessMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            casing: IndexMap::new(),
        }
    }
}

/// Lowercase form used for every case-insensitive name comparison.
pub fn normalize(key: &str) -> String {
    key.chars().flat_map(char::to_lowercase).collect()
}

/// Whether two names are equal under [`normalize`].
pub fn eq_caseless(a: &str, b: &str) -> bool {
    a == b
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

impl<V> CaselessMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, remembering `key`'s casing.
    ///
    /// Re-inserting an existing key replaces both value and casing but keeps
    /// the entry's position. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let norm = normalize(&key);
        self.casing.insert(norm.clone(), key);
        self.entries.insert(norm, value)
    }

    /// Look up a value case-insensitively.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(&normalize(key))
    }

    /// Look up a value case-insensitively, falling back to `fallback`.
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a V) -> &'a V {
        self.get(key).unwrap_or(fallback)
    }

    /// Mutable case-insensitive lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(&normalize(key))
    }

    /// Whether a key is present, ignoring case.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize(key))
    }

    /// The remembered casing of `key`, if present.
    pub fn original_key(&self, key: &str) -> Option<&str> {
        self.casing.get(&normalize(key)).map(String::as_str)
    }

    /// Rewrite the remembered casing of an existing entry.
    ///
    /// The value is untouched. Returns `false` if no entry matches.
    pub fn update_key(&mut self, key: &str) -> bool {
        match self.casing.get_mut(&normalize(key)) {
            Some(original) => {
                *original = key.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove an entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let norm = normalize(key);
        self.casing.shift_remove(&norm);
        self.entries.shift_remove(&norm)
    }

    /// Keep only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &mut V) -> bool) {
        let casing = &mut self.casing;
        self.entries.retain(|norm, value| {
            let original = casing.get(norm).map(String::as_str).unwrap_or(norm.as_str());
            let kept = keep(original, value);
            if !kept {
                casing.shift_remove(norm);
            }
            kept
        });
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order, with their original casing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.casing.values().map(String::as_str)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Mutable values in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    /// `(original key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.casing
            .values()
            .map(String::as_str)
            .zip(self.entries.values())
    }

    /// `(original key, mutable value)` pairs in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.casing
            .values()
            .map(String::as_str)
            .zip(self.entries.values_mut())
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaselessMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V> IntoIterator for CaselessMap<V> {
    type Item = (String, V);
    type IntoIter = std::iter::Zip<
        indexmap::map::IntoValues<String, String>,
        indexmap::map::IntoValues<String, V>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.casing.into_values().zip(self.entries.into_values())
    }
}
