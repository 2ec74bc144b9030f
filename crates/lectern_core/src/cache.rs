//! crates/lectern_core/src/cache.rs
//!
//! Content-addressable cache keys for synthesized audio.
//!
//! A key is the SHA-256 digest over the whitespace-normalized request text
//! plus the generation parameters (voice, preset), so identical requests
//! resolve to the same artifact regardless of incidental formatting.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// A derived cache key; the hex digest doubles as the artifact file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for one synthesis request.
    ///
    /// `text` is expected to already be whitespace-normalized (the speech
    /// pipeline normalizes before key derivation). Fields are separated by
    /// a NUL byte so `("ab", "c")` and `("a", "bc")` cannot collide.
    pub fn derive(text: &str, voice: &str, preset: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update([0u8]);
        hasher.update(voice.as_bytes());
        hasher.update([0u8]);
        hasher.update(preset.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bookkeeping kept per cache entry. `last_accessed` is refreshed on every
/// hit to support a future eviction policy; none is enforced today.
#[derive(Debug, Clone)]
pub struct CacheEntryMeta {
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntryMeta {
    pub fn created_now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_accessed: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }
}
