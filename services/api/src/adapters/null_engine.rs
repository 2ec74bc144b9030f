//! services/api/src/adapters/null_engine.rs
//!
//! A stand-in `SynthesisEngine` used when no speech backend is configured.
//! The service still starts and serves the library; synthesis endpoints
//! report the engine as unavailable instead of failing at boot.

use async_trait::async_trait;

use lectern_core::audio::Waveform;
use lectern_core::ports::{EngineStatus, PortError, PortResult, SynthesisEngine};

#[derive(Default)]
pub struct NullEngine;

impl NullEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SynthesisEngine for NullEngine {
    async fn synthesize(
        &self,
        _chunk: &str,
        _voice: &str,
        _preset: &str,
        _temperature: f32,
    ) -> PortResult<Waveform> {
        Err(PortError::Unavailable(
            "no speech engine is configured".to_string(),
        ))
    }

    fn status(&self) -> EngineStatus {
        EngineStatus::Unavailable
    }

    fn voices(&self) -> Vec<String> {
        Vec::new()
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}
