//! Ordered, named artifact collection.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

/// Name-keyed artifact collection preserving registration order.
///
/// Duplicate names are not rejected: the last registration wins, keeping
/// the original position in the order, and a warning names the replaced
/// entry.
pub struct Catalog<T: ?Sized> {
    entries: Vec<(String, Arc<T>)>,
    index: HashMap<String, usize>,
}

impl<T: ?Sized> Catalog<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register an artifact under `name`.
    pub fn register(&mut self, name: impl Into<String>, artifact: Arc<T>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => {
                warn!("Duplicate artifact name {}, last registration wins", name);
                self.entries[position].1 = artifact;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, artifact));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.index
            .get(name)
            .map(|&position| self.entries[position].1.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.entries.iter().map(|(name, a)| (name.as_str(), a))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Catalog<T> {
    fn default() -> Self {
        Self::new()
    }
}
