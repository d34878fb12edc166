use std::collections::HashMap;
use crate::api::types::PoolId;
use crate::pool::error::PoolError;

/// Registry key for a pool name: trimmed and lowercased.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Registry of named pools.
/// Provides name-based pool lookup for game code that has no direct handle.
///
/// One registry lives in the `PoolContext` for the whole session; pools
/// register on initialization and unregister when disabled.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: HashMap<String, PoolId>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// Register `pool` under `name`. The first registration of a name wins;
    /// later ones are rejected with a warning and leave the registry untouched.
    pub fn register(&mut self, name: &str, pool: PoolId) -> Result<(), PoolError> {
        let key = normalize(name);
        if key.is_empty() {
            log::warn!("Global pool accessor cannot be empty ({})", pool);
            return Err(PoolError::MissingAccessor);
        }
        if self.pools.contains_key(&key) {
            log::warn!("Global pool accessor `{}` already exists", key);
            return Err(PoolError::DuplicateAccessor(key));
        }
        self.pools.insert(key, pool);
        Ok(())
    }

    /// Look up a pool by name. Logs an error if there is none.
    pub fn lookup(&self, name: &str) -> Option<PoolId> {
        let found = self.get(name);
        if found.is_none() {
            log::error!("No pool with name `{}`", name);
        }
        found
    }

    /// Look up a pool by name without logging on a miss.
    pub fn get(&self, name: &str) -> Option<PoolId> {
        self.pools.get(&normalize(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pools.contains_key(&normalize(name))
    }

    /// Remove a name. Missing names are ignored.
    pub fn unregister(&mut self, name: &str) -> Option<PoolId> {
        self.pools.remove(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.pools.clear();
    }
}
