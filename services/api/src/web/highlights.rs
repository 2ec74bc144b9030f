//! services/api/src/web/highlights.rs
//!
//! Axum handlers for creating, listing, editing and deleting highlights.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::books::AckResponse;
use crate::web::state::AppState;
use lectern_core::domain::{Highlight, HighlightPatch, NewHighlight, DEFAULT_HIGHLIGHT_COLOR};
use lectern_core::ports::PortError;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

fn default_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

/// The request payload for creating a highlight.
///
/// `book_id` is taken as a string so a malformed id gets the same 400 as
/// malformed path ids, rather than a deserialization rejection.
#[derive(Deserialize, ToSchema)]
pub struct CreateHighlightRequest {
    pub book_id: String,
    pub text_content: String,
    #[schema(value_type = Object)]
    pub start_position: serde_json::Value,
    #[schema(value_type = Object)]
    pub end_position: serde_json::Value,
    #[serde(default = "default_color")]
    pub color: String,
    pub note: Option<String>,
}

/// The request payload for editing a highlight. Both fields are optional,
/// but at least one must be present.
#[derive(Deserialize, ToSchema)]
pub struct UpdateHighlightRequest {
    pub color: Option<String>,
    pub note: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct HighlightResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub text_content: String,
    #[schema(value_type = Object)]
    pub start_position: serde_json::Value,
    #[schema(value_type = Object)]
    pub end_position: serde_json::Value,
    pub color: String,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Highlight> for HighlightResponse {
    fn from(h: Highlight) -> Self {
        Self {
            id: h.id,
            book_id: h.book_id,
            text_content: h.text_content,
            start_position: h.start_position,
            end_position: h.end_position,
            color: h.color,
            note: h.note,
            created_at: h.created_at,
        }
    }
}

fn parse_highlight_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| PortError::Validation(format!("'{raw}' is not a valid highlight id")).into())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a highlight on a book.
#[utoipa::path(
    post,
    path = "/highlights",
    request_body = CreateHighlightRequest,
    responses(
        (status = 201, description = "Highlight created", body = HighlightResponse),
        (status = 400, description = "Empty highlight text or malformed book id"),
        (status = 404, description = "No such book")
    )
)]
pub async fn create_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CreateHighlightRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.text_content.trim().is_empty() {
        return Err(PortError::Validation("highlight text is empty".to_string()).into());
    }
    let book_id = Uuid::parse_str(&request.book_id).map_err(|_| {
        ApiError::from(PortError::Validation(format!(
            "'{}' is not a valid book id",
            request.book_id
        )))
    })?;
    // The book must exist; positions within it are taken on trust.
    app_state.store.get_book(book_id).await?;

    let highlight = app_state
        .store
        .create_highlight(NewHighlight {
            book_id,
            text_content: request.text_content,
            start_position: request.start_position,
            end_position: request.end_position,
            color: request.color,
            note: request.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(HighlightResponse::from(highlight))))
}

/// List every highlight across all books, newest first.
#[utoipa::path(
    get,
    path = "/highlights",
    responses(
        (status = 200, description = "All highlights", body = [HighlightResponse])
    )
)]
pub async fn list_highlights_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let highlights = app_state.store.list_highlights().await?;
    let response: Vec<HighlightResponse> =
        highlights.into_iter().map(HighlightResponse::from).collect();
    Ok(Json(response))
}

/// List one book's highlights, oldest first.
#[utoipa::path(
    get,
    path = "/highlights/book/{book_id}",
    params(("book_id" = String, Path, description = "The book id")),
    responses(
        (status = 200, description = "The book's highlights", body = [HighlightResponse]),
        (status = 400, description = "Malformed book id")
    )
)]
pub async fn book_highlights_handler(
    State(app_state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = Uuid::parse_str(&book_id).map_err(|_| {
        ApiError::from(PortError::Validation(format!(
            "'{book_id}' is not a valid book id"
        )))
    })?;
    let highlights = app_state.store.highlights_for_book(book_id).await?;
    let response: Vec<HighlightResponse> =
        highlights.into_iter().map(HighlightResponse::from).collect();
    Ok(Json(response))
}

/// Edit a highlight's color or note.
#[utoipa::path(
    put,
    path = "/highlights/{id}",
    request_body = UpdateHighlightRequest,
    params(("id" = String, Path, description = "The highlight id")),
    responses(
        (status = 200, description = "The updated highlight", body = HighlightResponse),
        (status = 400, description = "Malformed id or empty patch"),
        (status = 404, description = "No such highlight")
    )
)]
pub async fn update_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateHighlightRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let highlight_id = parse_highlight_id(&id)?;
    let highlight = app_state
        .store
        .update_highlight(
            highlight_id,
            HighlightPatch {
                color: request.color,
                note: request.note,
            },
        )
        .await?;
    Ok(Json(HighlightResponse::from(highlight)))
}

/// Delete a highlight.
#[utoipa::path(
    delete,
    path = "/highlights/{id}",
    params(("id" = String, Path, description = "The highlight id")),
    responses(
        (status = 200, description = "Highlight deleted", body = AckResponse),
        (status = 400, description = "Malformed highlight id"),
        (status = 404, description = "No such highlight")
    )
)]
pub async fn delete_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let highlight_id = parse_highlight_id(&id)?;
    app_state.store.delete_highlight(highlight_id).await?;
    Ok(Json(AckResponse {
        success: true,
        message: "highlight deleted".to_string(),
    }))
}
