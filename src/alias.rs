//! Alias index: normalized free text -> canonical identifier.
//!
//! Every key goes through `util::normalize`, the same function applied to user input,
//! so lookups are case/accent/spacing insensitive by construction.

use std::collections::HashMap;

use tracing::debug;

use crate::util::normalize;

#[derive(Clone, Debug, Default)]
pub struct AliasIndex {
    map: HashMap<String, String>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` for `id`. Later registrations win, so curated synonyms
    /// inserted after catalog names can repoint ambiguous spellings.
    pub fn insert(&mut self, alias: &str, id: &str) {
        let key = normalize(alias);
        if key.is_empty() {
            return;
        }
        if let Some(prev) = self.map.insert(key.clone(), id.to_string()) {
            if prev != id {
                debug!(target: "game", %key, %prev, new = %id, "Alias repointed");
            }
        }
    }

    pub fn insert_all<'a>(&mut self, aliases: impl IntoIterator<Item = &'a str>, id: &str) {
        for a in aliases {
            self.insert(a, id);
        }
    }

    /// Resolve raw user input to a canonical identifier.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        self.map.get(&normalize(input)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All (normalized key, id) pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
