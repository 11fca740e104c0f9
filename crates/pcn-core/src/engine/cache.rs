use crate::core::models::network::{ContactNetwork, NetworkKey};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Built networks of one run, keyed by (protein, representative, band).
///
/// Entries are never replaced, so every algorithm invocation for a key sees the same
/// network.
#[derive(Debug, Default)]
pub struct NetworkCache {
    networks: HashMap<NetworkKey, ContactNetwork>,
    builds: usize,
}

impl NetworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NetworkKey) -> Option<&ContactNetwork> {
        self.networks.get(key)
    }

    /// Returns the cached network, running `build` only on the first request for `key`.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: &NetworkKey,
        build: impl FnOnce() -> Result<ContactNetwork, E>,
    ) -> Result<&ContactNetwork, E> {
        match self.networks.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let network = build()?;
                self.builds += 1;
                Ok(entry.insert(network))
            }
        }
    }

    /// How many networks were built (or read) rather than served from the cache.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
