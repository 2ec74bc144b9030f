pub mod fs_cache;
pub mod memory_cache;
pub mod memory_store;
pub mod null_engine;
pub mod openai_engine;
pub mod pg_store;

pub use fs_cache::FsAudioCache;
pub use memory_cache::MemoryAudioCache;
pub use memory_store::MemoryStore;
pub use null_engine::NullEngine;
pub use openai_engine::OpenAiSpeechEngine;
pub use pg_store::PgStore;
