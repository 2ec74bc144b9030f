//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FsAudioCache, MemoryStore, NullEngine, OpenAiSpeechEngine, PgStore},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, types::audio::Voice, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use lectern_core::ports::{AudioCache, BookStore, SynthesisEngine};
use lectern_core::speech::SpeechPipeline;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Book Store ---
    let store: Arc<dyn BookStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let pg_store = PgStore::new(db_pool);
            info!("Running database migrations...");
            pg_store.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(pg_store)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store (nothing will persist)");
            Arc::new(MemoryStore::new())
        }
    };

    // --- 3. Select the Synthesis Engine ---
    let engine: Arc<dyn SynthesisEngine> = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let openai_client = Client::with_config(openai_config);
            let default_voice = match config.tts_voice.to_lowercase().as_str() {
                "alloy" => Voice::Alloy,
                "echo" => Voice::Echo,
                "fable" => Voice::Fable,
                "onyx" => Voice::Onyx,
                "nova" => Voice::Nova,
                "shimmer" => Voice::Shimmer,
                _ => {
                    return Err(ApiError::Internal(format!(
                        "Invalid TTS voice specified in config: '{}'",
                        config.tts_voice
                    )))
                }
            };
            Arc::new(OpenAiSpeechEngine::new(openai_client, default_voice))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; speech synthesis will report unavailable");
            Arc::new(NullEngine::new())
        }
    };

    // --- 4. Initialize the Audio Cache and Speech Pipeline ---
    let cache: Arc<dyn AudioCache> = Arc::new(FsAudioCache::new(config.cache_dir.clone()).await?);
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let timeout = match config.synthesis_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let pipeline = Arc::new(
        SpeechPipeline::new(engine.clone(), cache.clone())
            .with_max_chunk_chars(config.max_chunk_chars)
            .with_timeout(timeout),
    );

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        engine,
        cache,
        pipeline,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = build_router(app_state).layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
