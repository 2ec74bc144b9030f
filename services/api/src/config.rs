//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: Option<String>,
    pub log_level: Level,
    pub upload_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub tts_voice: String,
    pub synthesis_timeout_secs: u64,
    pub max_chunk_chars: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        // Optional: without it the service runs against the in-memory store.
        let database_url = std::env::var("DATABASE_URL").ok();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Storage Paths ---
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));
        let cache_dir = std::env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./tts_cache"));

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Synthesis Settings ---
        let tts_voice = std::env::var("TTS_VOICE").unwrap_or_else(|_| "alloy".to_string());

        let synthesis_timeout_str =
            std::env::var("SYNTHESIS_TIMEOUT_SECS").unwrap_or_else(|_| "120".to_string());
        let synthesis_timeout_secs = synthesis_timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "SYNTHESIS_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a valid number of seconds", synthesis_timeout_str),
            )
        })?;

        let max_chunk_chars_str =
            std::env::var("MAX_CHUNK_CHARS").unwrap_or_else(|_| "500".to_string());
        let max_chunk_chars = max_chunk_chars_str.parse::<usize>().map_err(|_| {
            ConfigError::InvalidValue(
                "MAX_CHUNK_CHARS".to_string(),
                format!("'{}' is not a valid chunk size", max_chunk_chars_str),
            )
        })?;
        if max_chunk_chars == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_CHUNK_CHARS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            upload_dir,
            cache_dir,
            openai_api_key,
            tts_voice,
            synthesis_timeout_secs,
            max_chunk_chars,
        })
    }
}
