//! crates/lectern_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases,
//! filesystems, or hosted speech engines.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::audio::Waveform;
use crate::cache::CacheKey;
use crate::domain::{Book, Highlight, HighlightPatch, NewHighlight};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by all port operations.
///
/// Each variant maps onto one HTTP class at the service edge: `Validation`
/// to 400, `NotFound` to 404, `Unavailable` to 503 and `Processing` to 500.
/// `Processing` messages are logged with context and never forwarded
/// verbatim to callers.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Capability unavailable: {0}")]
    Unavailable(String),
    #[error("Processing failed: {0}")]
    Processing(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BookStore: Send + Sync {
    // --- Book Management ---
    async fn insert_book(&self, book: Book) -> PortResult<()>;

    /// All books, ordered by upload date descending (newest first).
    async fn list_books(&self) -> PortResult<Vec<Book>>;

    async fn get_book(&self, book_id: Uuid) -> PortResult<Book>;

    /// Overwrites the reading position and touches `last_read`.
    async fn update_position(&self, book_id: Uuid, position: Value) -> PortResult<()>;

    /// Removes the book and every highlight that references it.
    async fn delete_book(&self, book_id: Uuid) -> PortResult<()>;

    // --- Highlight Management ---
    async fn create_highlight(&self, highlight: NewHighlight) -> PortResult<Highlight>;

    /// Highlights for one book, ordered by creation time ascending
    /// (oldest first).
    async fn highlights_for_book(&self, book_id: Uuid) -> PortResult<Vec<Highlight>>;

    /// All highlights across books, ordered by creation time descending
    /// (newest first). Note the ordering is intentionally the reverse of
    /// [`BookStore::highlights_for_book`].
    async fn list_highlights(&self) -> PortResult<Vec<Highlight>>;

    async fn update_highlight(
        &self,
        highlight_id: Uuid,
        patch: HighlightPatch,
    ) -> PortResult<Highlight>;

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()>;
}

/// The lifecycle state of a synthesis engine instance. Owned by the engine
/// handle injected at construction; never a process-wide flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Uninitialized,
    Ready,
    Unavailable,
}

#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Converts one text chunk into a waveform at [`crate::audio::SAMPLE_RATE`].
    ///
    /// Fails with `PortError::Unavailable` when the engine is not usable and
    /// with `PortError::Processing` when a generation attempt fails.
    async fn synthesize(
        &self,
        chunk: &str,
        voice: &str,
        preset: &str,
        temperature: f32,
    ) -> PortResult<Waveform>;

    fn status(&self) -> EngineStatus;

    /// Voice names this engine can speak with. Best effort; may be empty.
    fn voices(&self) -> Vec<String>;

    /// Whether this engine tolerates concurrent `synthesize` calls.
    ///
    /// This is a capability property declared by the adapter; the speech
    /// pipeline serializes calls through a single gate when it is `false`.
    fn supports_concurrent_calls(&self) -> bool;
}

#[async_trait]
pub trait AudioCache: Send + Sync {
    /// Returns the cached artifact for the key, refreshing its last-access
    /// time, or `None` on a miss.
    async fn lookup(&self, key: &CacheKey) -> PortResult<Option<Vec<u8>>>;

    /// Stores an artifact under the key. Concurrent writes to the same key
    /// are tolerated; last write wins.
    async fn store(&self, key: &CacheKey, artifact: &[u8]) -> PortResult<()>;
}
