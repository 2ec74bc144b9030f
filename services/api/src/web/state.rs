//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use lectern_core::ports::{AudioCache, BookStore, SynthesisEngine};
use lectern_core::speech::SpeechPipeline;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookStore>,
    pub engine: Arc<dyn SynthesisEngine>,
    pub cache: Arc<dyn AudioCache>,
    pub pipeline: Arc<SpeechPipeline>,
    pub config: Arc<Config>,
}
