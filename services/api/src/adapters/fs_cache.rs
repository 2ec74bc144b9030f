//! services/api/src/adapters/fs_cache.rs
//!
//! A filesystem implementation of the `AudioCache` port. Each artifact is
//! one `<digest>.wav` file under the cache root, addressed purely by its
//! content key. Entries are kept indefinitely; there is no eviction.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use lectern_core::cache::{CacheEntryMeta, CacheKey};
use lectern_core::ports::{AudioCache, PortError, PortResult};

pub struct FsAudioCache {
    root: PathBuf,
    // Access metadata lives in memory only; losing it on restart is fine
    // because nothing is ever evicted.
    meta: RwLock<HashMap<String, CacheEntryMeta>>,
}

impl FsAudioCache {
    /// Creates the cache, making sure the root directory exists.
    pub async fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            meta: RwLock::new(HashMap::new()),
        })
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.wav", key.as_hex()))
    }
}

#[async_trait]
impl AudioCache for FsAudioCache {
    async fn lookup(&self, key: &CacheKey) -> PortResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut meta = self.meta.write().await;
                meta.entry(key.as_hex().to_string())
                    .or_insert_with(CacheEntryMeta::created_now)
                    .touch();
                debug!(key = %key, bytes = bytes.len(), "audio cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Processing(format!(
                "failed to read cache entry: {e}"
            ))),
        }
    }

    async fn store(&self, key: &CacheKey, artifact: &[u8]) -> PortResult<()> {
        let path = self.path_for(key);
        tokio::fs::write(&path, artifact)
            .await
            .map_err(|e| PortError::Processing(format!("failed to write cache entry: {e}")))?;
        self.meta
            .write()
            .await
            .insert(key.as_hex().to_string(), CacheEntryMeta::created_now());
        debug!(key = %key, bytes = artifact.len(), "audio cache store");
        Ok(())
    }
}
