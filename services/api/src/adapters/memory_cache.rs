//! services/api/src/adapters/memory_cache.rs
//!
//! An in-memory implementation of the `AudioCache` port, useful for tests
//! and for running without any writable storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use lectern_core::cache::{CacheEntryMeta, CacheKey};
use lectern_core::ports::{AudioCache, PortResult};

#[derive(Default)]
pub struct MemoryAudioCache {
    entries: RwLock<HashMap<String, (Vec<u8>, CacheEntryMeta)>>,
}

impl MemoryAudioCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioCache for MemoryAudioCache {
    async fn lookup(&self, key: &CacheKey) -> PortResult<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        Ok(entries.get_mut(key.as_hex()).map(|(artifact, meta)| {
            meta.touch();
            artifact.clone()
        }))
    }

    async fn store(&self, key: &CacheKey, artifact: &[u8]) -> PortResult<()> {
        self.entries.write().await.insert(
            key.as_hex().to_string(),
            (artifact.to_vec(), CacheEntryMeta::created_now()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_refreshes_last_access() {
        let cache = MemoryAudioCache::new();
        let key = CacheKey::derive("some text", "alloy", "fast");
        cache.store(&key, b"artifact").await.unwrap();

        let stored_at = cache
            .entries
            .read()
            .await
            .get(key.as_hex())
            .unwrap()
            .1
            .last_accessed;
        cache.lookup(&key).await.unwrap();
        let touched_at = cache
            .entries
            .read()
            .await
            .get(key.as_hex())
            .unwrap()
            .1
            .last_accessed;
        assert!(touched_at >= stored_at);
    }
}
