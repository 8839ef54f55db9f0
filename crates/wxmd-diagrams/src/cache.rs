//! In-memory render cache.

use std::collections::HashMap;
use std::sync::RwLock;

use sha2::{Digest, Sha256};

/// Parameters that determine a rendered diagram.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram source code.
    pub source: &'a str,
    /// Engine theme.
    pub theme: &'a str,
    /// Requested background color.
    pub background: &'a str,
}

impl DiagramKey<'_> {
    /// Compute a content hash for this key.
    ///
    /// SHA-256 of theme, background and source joined with NUL bytes, so no
    /// combination of fields can collide with another.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.theme.as_bytes());
        hasher.update([0]);
        hasher.update(self.background.as_bytes());
        hasher.update([0]);
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Unbounded map from [`DiagramKey`] hash to rendered markup.
///
/// Entries are never evicted; [`RenderCache::clear`] is the only way to drop
/// them.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: RwLock<HashMap<String, String>>,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up rendered markup.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, key: DiagramKey<'_>) -> Option<String> {
        self.entries
            .read()
            .unwrap()
            .get(&key.compute_hash())
            .cloned()
    }

    /// Store rendered markup.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, key: DiagramKey<'_>, markup: String) {
        self.entries
            .write()
            .unwrap()
            .insert(key.compute_hash(), markup);
    }

    /// Drop every entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
