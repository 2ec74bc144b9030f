pub mod audio;
pub mod cache;
pub mod chunker;
pub mod domain;
pub mod ingest;
pub mod ports;
pub mod speech;

pub use audio::{Waveform, SAMPLE_RATE};
pub use cache::{CacheEntryMeta, CacheKey};
pub use domain::{Book, BookStructure, Chapter, FileType, Highlight, HighlightPatch, NewHighlight, Page};
pub use ingest::{ingest_upload, IngestedBook, MAX_UPLOAD_BYTES};
pub use ports::{AudioCache, BookStore, EngineStatus, PortError, PortResult, SynthesisEngine};
pub use speech::{SpeechPipeline, MAX_REQUEST_CHARS};
