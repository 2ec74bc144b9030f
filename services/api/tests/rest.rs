//! services/api/tests/rest.rs
//!
//! Integration tests for the REST API, run against the in-memory store and
//! the null synthesis engine so no external services are needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::adapters::{MemoryAudioCache, MemoryStore, NullEngine};
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use lectern_core::domain::{Book, BookStructure, Chapter, FileType};
use lectern_core::ports::{AudioCache, BookStore, SynthesisEngine};
use lectern_core::speech::SpeechPipeline;

async fn test_state() -> Arc<AppState> {
    let scratch = std::env::temp_dir().join(format!("lectern-api-test-{}", Uuid::new_v4()));
    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: tracing::Level::INFO,
        upload_dir: scratch.join("uploads"),
        cache_dir: scratch.join("cache"),
        openai_api_key: None,
        tts_voice: "alloy".to_string(),
        synthesis_timeout_secs: 120,
        max_chunk_chars: 500,
    });
    let store: Arc<dyn BookStore> = Arc::new(MemoryStore::new());
    let engine: Arc<dyn SynthesisEngine> = Arc::new(NullEngine::new());
    let cache: Arc<dyn AudioCache> = Arc::new(MemoryAudioCache::new());
    let pipeline = Arc::new(SpeechPipeline::new(engine.clone(), cache.clone()));
    Arc::new(AppState {
        store,
        engine,
        cache,
        pipeline,
        config,
    })
}

async fn test_app() -> (Router, Arc<AppState>) {
    let state = test_state().await;
    (build_router(state.clone()), state)
}

fn sample_book() -> Book {
    let content = "The rain had stopped by the time she reached the bridge, \
                   and the river below was running high and brown.";
    Book {
        id: Uuid::new_v4(),
        title: "The Bridge".to_string(),
        author: "A. Writer".to_string(),
        file_type: FileType::Epub,
        size_bytes: 2048,
        cover_image: None,
        upload_date: chrono::Utc::now(),
        last_read: None,
        current_position: None,
        structure: BookStructure::Chapters(vec![
            Chapter {
                id: "ch1".to_string(),
                title: "Crossing".to_string(),
                content: content.to_string(),
                word_count: content.split_whitespace().count(),
            },
            Chapter {
                id: "ch2".to_string(),
                title: "The Far Bank".to_string(),
                content: "She waited there until dark.".to_string(),
                word_count: 5,
            },
        ]),
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "lectern-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/books/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

//=========================================================================================
// Upload validation
//=========================================================================================

#[tokio::test]
async fn upload_of_unsupported_extension_is_rejected() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(multipart_upload("book.mobi", b"some bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("mobi"));
}

#[tokio::test]
async fn upload_of_empty_file_is_rejected() {
    let (app, _) = test_app().await;
    let response = app.oneshot(multipart_upload("book.epub", b"")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_extension_is_rejected() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(multipart_upload("README", b"plain text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_of_a_corrupt_epub_is_an_internal_error() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(multipart_upload("book.epub", b"not actually a zip archive"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // Parser details stay out of the response body.
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal server error");
}

//=========================================================================================
// Library
//=========================================================================================

#[tokio::test]
async fn empty_library_lists_as_empty_array() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/books").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn malformed_book_id_is_a_bad_request() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/books/not-a-uuid").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(
            Request::get(format!("/books/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_without_selector_is_the_table_of_contents() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/books/{id}/content"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "toc");
    let toc = body["chapters"].as_array().unwrap();
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0]["id"], "ch1");
    // Entries carry id/title/word_count only; the chapter text itself
    // comes from a selecting request.
    assert!(toc[0].get("content").is_none());
    assert!(body.get("content").is_none());
}

#[tokio::test]
async fn content_without_selector_lists_pages_for_pdf() {
    let (app, state) = test_app().await;
    let mut book = sample_book();
    book.file_type = FileType::Pdf;
    book.structure = BookStructure::Pages(vec![
        lectern_core::domain::Page {
            page_number: 1,
            content: "First page text".to_string(),
            word_count: 3,
        },
        lectern_core::domain::Page {
            page_number: 2,
            content: "Second page text".to_string(),
            word_count: 3,
        },
    ]);
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/books/{id}/content"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "pdf_info");
    assert_eq!(body["total_pages"], 2);
    let pages = body["pages"].as_array().unwrap();
    assert_eq!(pages[0]["page_number"], 1);
    assert!(pages[0].get("content").is_none());
}

#[tokio::test]
async fn content_selects_a_chapter_by_id() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/books/{id}/content?chapter_id=ch2"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "chapter");
    assert_eq!(body["content"]["title"], "The Far Bank");
}

#[tokio::test]
async fn unknown_chapter_is_not_found() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/books/{id}/content?chapter_id=ch9"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn position_update_touches_last_read() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/books/{id}/position"),
            json!({ "position": { "chapter_id": "ch2", "offset": 12 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let book = state.store.get_book(id).await.unwrap();
    assert!(book.last_read.is_some());
    assert_eq!(
        book.current_position,
        Some(json!({ "chapter_id": "ch2", "offset": 12 }))
    );
}

#[tokio::test]
async fn deleting_a_book_removes_its_highlights() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let create = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/highlights",
            json!({
                "book_id": id,
                "text_content": "running high and brown",
                "start_position": { "offset": 70 },
                "end_position": { "offset": 92 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::delete(format!("/books/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(state.store.list_highlights().await.unwrap().is_empty());
}

//=========================================================================================
// Highlights
//=========================================================================================

#[tokio::test]
async fn highlight_with_malformed_book_id_is_a_bad_request() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/highlights",
            json!({
                "book_id": "not-a-uuid",
                "text_content": "something",
                "start_position": { "offset": 0 },
                "end_position": { "offset": 9 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn highlight_on_an_unknown_book_is_not_found() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/highlights",
            json!({
                "book_id": Uuid::new_v4(),
                "text_content": "something",
                "start_position": { "offset": 0 },
                "end_position": { "offset": 9 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn highlight_color_defaults_to_yellow() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let id = book.id;
    state.store.insert_book(book).await.unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/highlights",
            json!({
                "book_id": id,
                "text_content": "the bridge",
                "start_position": { "offset": 40 },
                "end_position": { "offset": 50 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["color"], "#ffff00");
}

#[tokio::test]
async fn empty_highlight_patch_is_a_bad_request() {
    let (app, state) = test_app().await;
    let book = sample_book();
    let book_id = book.id;
    state.store.insert_book(book).await.unwrap();
    let highlight = state
        .store
        .create_highlight(lectern_core::domain::NewHighlight {
            book_id,
            text_content: "she waited".to_string(),
            start_position: json!({ "offset": 0 }),
            end_position: json!({ "offset": 10 }),
            color: "#ffff00".to_string(),
            note: None,
        })
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/highlights/{}", highlight.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_unknown_highlight_is_not_found() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(
            Request::delete(format!("/highlights/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//=========================================================================================
// Speech
//=========================================================================================

#[tokio::test]
async fn speech_request_with_blank_text_is_rejected() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/tts/generate",
            json!({ "text": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn speech_request_over_the_length_limit_is_rejected() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/tts/generate",
            json!({ "text": "a".repeat(1001) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn speech_without_an_engine_is_unavailable() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/tts/generate",
            json!({ "text": "Read this aloud please." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn voice_and_preset_discovery_always_respond() {
    let (app, _) = test_app().await;

    let voices = app
        .clone()
        .oneshot(Request::get("/tts/voices").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(voices.status(), StatusCode::OK);
    let body = body_json(voices).await;
    assert_eq!(body["default"], "alloy");

    let presets = app
        .oneshot(Request::get("/tts/presets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(presets.status(), StatusCode::OK);
    let body = body_json(presets).await;
    assert_eq!(body["default"], "fast");
    assert_eq!(body["presets"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn engine_status_reports_unavailable_without_a_backend() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/tts/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unavailable");
}
