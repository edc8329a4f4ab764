//! Process-wide registry of every group and teacher name seen in any document.
//!
//! Names are only ever added. A name that disappears from a later document
//! stays searchable until the process restarts.

use parking_lot::RwLock;
use std::collections::BTreeSet;

use crate::api::EntityKind;

/// Maximum number of names returned by a search.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Append-only set of observed entity names.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    groups: RwLock<BTreeSet<String>>,
    teachers: RwLock<BTreeSet<String>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn names(&self, kind: EntityKind) -> &RwLock<BTreeSet<String>> {
        match kind {
            EntityKind::Group => &self.groups,
            EntityKind::Teacher => &self.teachers,
        }
    }

    /// Record names of one kind. Already known names are ignored.
    pub fn extend<'a>(&self, kind: EntityKind, names: impl IntoIterator<Item = &'a str>) {
        let mut known = self.names(kind).write();
        for name in names {
            if !known.contains(name) {
                known.insert(name.to_string());
            }
        }
    }

    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        self.names(kind).read().contains(name)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.names(kind).read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty() && self.teachers.read().is_empty()
    }

    /// Case-insensitive substring search, sorted, at most [`MAX_SEARCH_RESULTS`] names.
    pub fn search(&self, kind: EntityKind, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.names(kind)
            .read()
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(MAX_SEARCH_RESULTS)
            .cloned()
            .collect()
    }
}
