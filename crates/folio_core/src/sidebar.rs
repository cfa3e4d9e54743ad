//! Per-section sidebar expansion preferences

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The catch-all entry applied to sections without an explicit preference.
pub const DEFAULT_SECTION: &str = "default";

/// Section name to expanded flag. Serializes as the single persisted JSON
/// value; see the state crate for the store that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SidebarPrefs {
    entries: BTreeMap<String, bool>,
}

impl Default for SidebarPrefs {
    /// The blog reads better with the navigation out of the way; everything
    /// else starts expanded.
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("blog".to_string(), false);
        entries.insert(DEFAULT_SECTION.to_string(), true);
        SidebarPrefs { entries }
    }
}

impl SidebarPrefs {
    pub fn expanded_for(&self, section: &str) -> bool {
        match self.entries.get(section) {
            Some(expanded) => *expanded,
            None => self
                .entries
                .get(DEFAULT_SECTION)
                .copied()
                .unwrap_or(true),
        }
    }

    pub fn set(&mut self, section: &str, expanded: bool) {
        self.entries.insert(section.to_string(), expanded);
    }

    /// Flips the preference for `section` and returns the new value.
    pub fn toggle(&mut self, section: &str) -> bool {
        let next = !self.expanded_for(section);
        self.set(section, next);
        next
    }
}
