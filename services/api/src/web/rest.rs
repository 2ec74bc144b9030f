//! services/api/src/web/rest.rs
//!
//! Assembles the Axum router for the REST API and holds the master
//! definition for the OpenAPI specification.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::web::books::{
    book_content_handler, delete_book_handler, get_book_handler, list_books_handler,
    update_position_handler, upload_book_handler, AckResponse, BookSummary, PositionRequest,
    UploadResponse,
};
use crate::web::highlights::{
    book_highlights_handler, create_highlight_handler, delete_highlight_handler,
    list_highlights_handler, update_highlight_handler, CreateHighlightRequest,
    HighlightResponse, UpdateHighlightRequest,
};
use crate::web::state::AppState;
use crate::web::tts::{
    engine_status_handler, generate_speech_handler, list_presets_handler, list_voices_handler,
    SpeechRequest, VoicesResponse,
};
use lectern_core::ingest::MAX_UPLOAD_BYTES;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::books::upload_book_handler,
        crate::web::books::list_books_handler,
        crate::web::books::get_book_handler,
        crate::web::books::book_content_handler,
        crate::web::books::update_position_handler,
        crate::web::books::delete_book_handler,
        crate::web::highlights::create_highlight_handler,
        crate::web::highlights::list_highlights_handler,
        crate::web::highlights::book_highlights_handler,
        crate::web::highlights::update_highlight_handler,
        crate::web::highlights::delete_highlight_handler,
        crate::web::tts::generate_speech_handler,
        crate::web::tts::list_voices_handler,
        crate::web::tts::list_presets_handler,
        crate::web::tts::engine_status_handler,
    ),
    components(
        schemas(
            UploadResponse,
            BookSummary,
            AckResponse,
            PositionRequest,
            CreateHighlightRequest,
            UpdateHighlightRequest,
            HighlightResponse,
            SpeechRequest,
            VoicesResponse,
        )
    ),
    tags(
        (name = "Lectern API", description = "API endpoints for the ebook library and audiobook service.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the application router with every REST route attached.
///
/// The multipart body limit sits above the ingestion limit so oversized
/// uploads reach the validator and receive its 400 instead of a framework
/// rejection.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/books/upload", post(upload_book_handler))
        .route("/books", get(list_books_handler))
        .route(
            "/books/{id}",
            get(get_book_handler).delete(delete_book_handler),
        )
        .route("/books/{id}/content", get(book_content_handler))
        .route("/books/{id}/position", post(update_position_handler))
        .route(
            "/highlights",
            post(create_highlight_handler).get(list_highlights_handler),
        )
        .route("/highlights/book/{book_id}", get(book_highlights_handler))
        .route(
            "/highlights/{id}",
            put(update_highlight_handler).delete(delete_highlight_handler),
        )
        .route("/tts/generate", post(generate_speech_handler))
        .route("/tts/voices", get(list_voices_handler))
        .route("/tts/presets", get(list_presets_handler))
        .route("/tts/status", get(engine_status_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .with_state(app_state)
}
