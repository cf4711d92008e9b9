//! Token-validated cache for loaded price universes.
//!
//! Owned by whatever loads the data (file reader, provider client). Entries
//! are keyed by source name and only served while the caller's freshness
//! token (a content hash or file mtime) still matches.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::PriceUniverse;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FreshnessToken(pub String);

impl FreshnessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[derive(Debug)]
struct CacheEntry {
    token: FreshnessToken,
    universe: Arc<PriceUniverse>,
}

#[derive(Debug, Default)]
pub struct UniverseCache {
    entries: DashMap<String, CacheEntry>,
}

impl UniverseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached universe for `source`, only if it was stored under `token`.
    pub fn get(&self, source: &str, token: &FreshnessToken) -> Option<Arc<PriceUniverse>> {
        let entry = self.entries.get(source)?;
        if &entry.token == token {
            Some(Arc::clone(&entry.universe))
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        source: impl Into<String>,
        token: FreshnessToken,
        universe: PriceUniverse,
    ) -> Arc<PriceUniverse> {
        let universe = Arc::new(universe);
        self.entries.insert(
            source.into(),
            CacheEntry {
                token,
                universe: Arc::clone(&universe),
            },
        );
        universe
    }

    /// Return the cached universe or run `load` and cache its result.
    /// A failed load leaves any stale entry untouched.
    pub fn get_or_load<F, E>(
        &self,
        source: &str,
        token: &FreshnessToken,
        load: F,
    ) -> Result<Arc<PriceUniverse>, E>
    where
        F: FnOnce() -> Result<PriceUniverse, E>,
    {
        if let Some(hit) = self.get(source, token) {
            return Ok(hit);
        }
        let universe = load()?;
        Ok(self.insert(source, token.clone(), universe))
    }

    /// Drop the entry for `source`. Returns whether one existed.
    pub fn invalidate(&self, source: &str) -> bool {
        self.entries.remove(source).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
