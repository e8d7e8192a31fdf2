//! Drop-guarded ownership of a cache file.

use crate::{AssetStore, CacheName};
use std::sync::Arc;

/// Ownership of one staged cache file.
///
/// Dropping an unreleased slot asks the store to delete the file. A slot is
/// released once the store has finalized its file into an asset, after which
/// the store owns the bytes.
pub struct CacheSlot {
    name: CacheName,
    store: Arc<dyn AssetStore>,
    released: bool,
}

impl CacheSlot {
    /// Take ownership of `name` in `store`.
    pub fn new(name: CacheName, store: Arc<dyn AssetStore>) -> Self {
        tracing::debug!(cache_name = %name, "Acquired cache slot");
        Self {
            name,
            store,
            released: false,
        }
    }

    /// Name of the cache file.
    pub fn name(&self) -> &CacheName {
        &self.name
    }

    /// Hand the file over to the store; it will not be deleted on drop.
    pub fn release(mut self) -> CacheName {
        self.released = true;
        tracing::debug!(cache_name = %self.name, "Released cache slot");
        self.name.clone()
    }
}

impl std::fmt::Debug for CacheSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSlot")
            .field("name", &self.name)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for CacheSlot {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.store.delete_cache(&self.name) {
            Ok(()) => tracing::debug!(cache_name = %self.name, "Deleted abandoned cache slot"),
            Err(e) => tracing::warn!(
                cache_name = %self.name,
                error = %e,
                "Failed to delete abandoned cache slot"
            ),
        }
    }
}
