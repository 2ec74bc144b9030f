//! crates/lectern_core/src/speech.rs
//!
//! The speech pipeline: turns a text request into a single WAV artifact.
//!
//! The pipeline owns ordering. Chunks are synthesized strictly in text
//! order and concatenated in that same order, so the assembled waveform
//! reads the request front to back regardless of what the engine does
//! per call. Engines that cannot take concurrent calls are serialized
//! through a single gate held across each call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::audio::{self, Waveform};
use crate::cache::CacheKey;
use crate::chunker::{self, DEFAULT_MAX_CHUNK_CHARS};
use crate::ports::{AudioCache, EngineStatus, PortError, PortResult, SynthesisEngine};

/// Requests longer than this are rejected before normalization.
pub const MAX_REQUEST_CHARS: usize = 1000;

/// Default per-chunk synthesis temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct SpeechPipeline {
    engine: Arc<dyn SynthesisEngine>,
    cache: Arc<dyn AudioCache>,
    max_chunk_chars: usize,
    temperature: f32,
    timeout: Option<Duration>,
    // Present only for engines that declare no concurrency support.
    call_gate: Option<Mutex<()>>,
}

impl SpeechPipeline {
    pub fn new(engine: Arc<dyn SynthesisEngine>, cache: Arc<dyn AudioCache>) -> Self {
        let call_gate = if engine.supports_concurrent_calls() {
            None
        } else {
            Some(Mutex::new(()))
        };
        Self {
            engine,
            cache,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
            call_gate,
        }
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Synthesizes `text` with the given voice and preset, returning the
    /// encoded WAV bytes of the complete utterance.
    ///
    /// Identical (text, voice, preset) requests after normalization are
    /// served from the cache without touching the engine.
    pub async fn generate(&self, text: &str, voice: &str, preset: &str) -> PortResult<Vec<u8>> {
        if text.chars().count() > MAX_REQUEST_CHARS {
            return Err(PortError::Validation(format!(
                "text too long (max {MAX_REQUEST_CHARS} characters)"
            )));
        }
        let normalized = chunker::normalize_whitespace(text);
        if normalized.is_empty() {
            return Err(PortError::Validation("text is empty".to_string()));
        }

        if self.engine.status() != EngineStatus::Ready {
            return Err(PortError::Unavailable(
                "speech engine is not available".to_string(),
            ));
        }

        let key = CacheKey::derive(&normalized, voice, preset);
        match self.cache.lookup(&key).await {
            Ok(Some(artifact)) => {
                debug!(key = %key, "serving synthesized audio from cache");
                return Ok(artifact);
            }
            Ok(None) => {}
            Err(err) => warn!(key = %key, error = %err, "cache lookup failed, synthesizing"),
        }

        let chunks = chunker::chunk_text(&normalized, self.max_chunk_chars);
        debug!(chunks = chunks.len(), voice, preset, "synthesizing speech request");

        let mut waveforms = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            waveforms.push(self.synthesize_chunk(chunk, voice, preset).await?);
        }

        let assembled = audio::concat(&waveforms);
        let artifact = audio::encode_wav(&assembled)?;

        if let Err(err) = self.cache.store(&key, &artifact).await {
            warn!(key = %key, error = %err, "failed to cache synthesized audio");
        }
        info!(
            chunks = chunks.len(),
            samples = assembled.len(),
            "speech request assembled"
        );
        Ok(artifact)
    }

    async fn synthesize_chunk(
        &self,
        chunk: &str,
        voice: &str,
        preset: &str,
    ) -> PortResult<Waveform> {
        let _permit = match &self.call_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };
        let call = self.engine.synthesize(chunk, voice, preset, self.temperature);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| PortError::Processing("synthesis timed out".to_string()))?,
            None => call.await,
        }
    }
}
