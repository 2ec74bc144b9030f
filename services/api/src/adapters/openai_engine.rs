//! services/api/src/adapters/openai_engine.rs
//!
//! This module contains the adapter for OpenAI's speech synthesis API.
//! It implements the `SynthesisEngine` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::audio::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;

use lectern_core::audio::{self, Waveform};
use lectern_core::ports::{EngineStatus, PortError, PortResult, SynthesisEngine};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SynthesisEngine` port using the OpenAI speech API.
#[derive(Clone)]
pub struct OpenAiSpeechEngine {
    client: Client<OpenAIConfig>,
    default_voice: Voice,
}

impl OpenAiSpeechEngine {
    /// Creates a new `OpenAiSpeechEngine`.
    pub fn new(client: Client<OpenAIConfig>, default_voice: Voice) -> Self {
        Self {
            client,
            default_voice,
        }
    }

    fn map_voice(&self, voice: &str) -> Voice {
        match voice {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            // Unknown names (including "random") fall back to the default.
            _ => self.default_voice.clone(),
        }
    }

    fn map_preset(preset: &str) -> SpeechModel {
        match preset {
            "standard" | "high_quality" => SpeechModel::Tts1Hd,
            _ => SpeechModel::Tts1,
        }
    }
}

//=========================================================================================
// `SynthesisEngine` Trait Implementation
//=========================================================================================

#[async_trait]
impl SynthesisEngine for OpenAiSpeechEngine {
    /// Synthesizes one chunk into a waveform.
    ///
    /// The hosted API has no temperature control, so that knob is accepted
    /// and ignored here.
    async fn synthesize(
        &self,
        chunk: &str,
        voice: &str,
        preset: &str,
        _temperature: f32,
    ) -> PortResult<Waveform> {
        let request = CreateSpeechRequest {
            model: Self::map_preset(preset),
            input: chunk.to_string(),
            voice: self.map_voice(voice),
            response_format: Some(SpeechResponseFormat::Wav),
            ..Default::default()
        };

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .speech()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Processing(e.to_string()))?;

        audio::decode_wav(&response.bytes)
    }

    fn status(&self) -> EngineStatus {
        EngineStatus::Ready
    }

    fn voices(&self) -> Vec<String> {
        ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}
