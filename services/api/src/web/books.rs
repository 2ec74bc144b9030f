//! services/api/src/web/books.rs
//!
//! Axum handlers for the library: uploading, listing, reading and deleting
//! books, plus reading-position updates.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use lectern_core::domain::{Book, BookStructure};
use lectern_core::ingest;
use lectern_core::ports::PortError;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully uploading a book.
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub file_type: String,
    pub unit_count: usize,
    pub total_words: usize,
}

/// A library listing entry. The full structure is omitted to keep the
/// listing payload small; fetch a single book for the complete record.
#[derive(Serialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub file_type: String,
    pub size_bytes: u64,
    pub cover_image: Option<String>,
    pub upload_date: chrono::DateTime<chrono::Utc>,
    pub last_read: Option<chrono::DateTime<chrono::Utc>>,
    pub unit_count: usize,
    pub total_words: usize,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            file_type: book.file_type.to_string(),
            size_bytes: book.size_bytes,
            cover_image: book.cover_image.clone(),
            upload_date: book.upload_date,
            last_read: book.last_read,
            unit_count: book.unit_count(),
            total_words: book.total_words(),
        }
    }
}

/// Query parameters selecting which part of a book to read.
#[derive(Deserialize, ToSchema)]
pub struct ContentQuery {
    pub chapter_id: Option<String>,
    pub page: Option<usize>,
}

/// The request payload for saving a reading position.
#[derive(Deserialize, ToSchema)]
pub struct PositionRequest {
    /// Opaque structural locator, stored verbatim.
    #[schema(value_type = Object)]
    pub position: serde_json::Value,
}

/// A generic acknowledgement for mutating endpoints.
#[derive(Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

fn parse_book_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| PortError::Validation(format!("'{raw}' is not a valid book id")).into())
}

/// Upload a book file (EPUB or PDF).
#[utoipa::path(
    post,
    path = "/books/upload",
    request_body(content_type = "multipart/form-data", description = "The book file to upload."),
    responses(
        (status = 201, description = "Book ingested successfully", body = UploadResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file"),
        (status = 500, description = "The file could not be parsed")
    )
)]
pub async fn upload_book_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| PortError::Validation(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| PortError::Validation("multipart form must include a file".to_string()))?;

    let filename = field
        .file_name()
        .ok_or_else(|| PortError::Validation("file part must carry a filename".to_string()))?
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| PortError::Validation(format!("failed to read file bytes: {e}")))?;

    // Parsing is CPU-bound; keep it off the async worker threads.
    let ingested = tokio::task::spawn_blocking({
        let data = data.clone();
        let filename = filename.clone();
        move || ingest::ingest_upload(&data, &filename)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ingestion task failed: {e}")))??;

    let book = ingested.into_book();

    tokio::fs::create_dir_all(&app_state.config.upload_dir).await?;
    let file_path = app_state.config.upload_dir.join(book.file_name());
    tokio::fs::write(&file_path, &data).await?;

    let response = UploadResponse {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        file_type: book.file_type.to_string(),
        unit_count: book.unit_count(),
        total_words: book.total_words(),
    };
    info!(
        book_id = %book.id,
        title = %book.title,
        units = response.unit_count,
        "book ingested"
    );
    app_state.store.insert_book(book).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List all books in the library, newest upload first.
#[utoipa::path(
    get,
    path = "/books",
    responses(
        (status = 200, description = "The library listing", body = [BookSummary])
    )
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let books = app_state.store.list_books().await?;
    let summaries: Vec<BookSummary> = books.iter().map(BookSummary::from).collect();
    Ok(Json(summaries))
}

/// Fetch one book's full record, including its structure.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = String, Path, description = "The book id")),
    responses(
        (status = 200, description = "The book record"),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    let book = app_state.store.get_book(book_id).await?;
    Ok(Json(book))
}

/// Fetch book content for reading.
///
/// For chaptered books the `chapter_id` query parameter selects a chapter;
/// for paged books `page` selects a page. With no selector the response is
/// the table of contents (or the page index), without any unit content.
#[utoipa::path(
    get,
    path = "/books/{id}/content",
    params(
        ("id" = String, Path, description = "The book id"),
        ("chapter_id" = Option<String>, Query, description = "Chapter to read (chaptered books)"),
        ("page" = Option<usize>, Query, description = "Page to read (paged books)")
    ),
    responses(
        (status = 200, description = "The selected unit, or the TOC/page index without a selector"),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "No such book, chapter or page")
    )
)]
pub async fn book_content_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    let book = app_state.store.get_book(book_id).await?;

    let body = match &book.structure {
        BookStructure::Chapters(chapters) => match &query.chapter_id {
            Some(wanted) => {
                let chapter = chapters.iter().find(|c| &c.id == wanted).ok_or_else(|| {
                    PortError::NotFound(format!("chapter '{wanted}' not found"))
                })?;
                json!({ "content": chapter, "type": "chapter" })
            }
            None => {
                let toc: Vec<_> = chapters
                    .iter()
                    .map(|c| json!({ "id": c.id, "title": c.title, "word_count": c.word_count }))
                    .collect();
                json!({ "chapters": toc, "type": "toc" })
            }
        },
        BookStructure::Pages(pages) => match query.page {
            Some(wanted) => {
                let page = pages
                    .iter()
                    .find(|p| p.page_number == wanted)
                    .ok_or_else(|| PortError::NotFound(format!("page {wanted} not found")))?;
                json!({ "content": page, "type": "page" })
            }
            None => {
                let index: Vec<_> = pages
                    .iter()
                    .map(|p| json!({ "page_number": p.page_number, "word_count": p.word_count }))
                    .collect();
                json!({ "pages": index, "total_pages": pages.len(), "type": "pdf_info" })
            }
        },
    };
    Ok(Json(body))
}

/// Save the reading position of a book.
#[utoipa::path(
    post,
    path = "/books/{id}/position",
    request_body = PositionRequest,
    params(("id" = String, Path, description = "The book id")),
    responses(
        (status = 200, description = "Position saved", body = AckResponse),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "No such book")
    )
)]
pub async fn update_position_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    app_state
        .store
        .update_position(book_id, request.position)
        .await?;
    Ok(Json(AckResponse {
        success: true,
        message: "position saved".to_string(),
    }))
}

/// Delete a book, its highlights and its stored file.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = String, Path, description = "The book id")),
    responses(
        (status = 200, description = "Book deleted", body = AckResponse),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    let book = app_state.store.get_book(book_id).await?;
    app_state.store.delete_book(book_id).await?;

    // File removal is best effort; the record is already gone.
    let file_path = app_state.config.upload_dir.join(book.file_name());
    if let Err(e) = tokio::fs::remove_file(&file_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(book_id = %book_id, error = %e, "failed to remove book file");
        }
    }

    Ok(Json(AckResponse {
        success: true,
        message: "book deleted".to_string(),
    }))
}
