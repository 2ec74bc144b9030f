//! services/api/src/adapters/pg_store.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `BookStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use lectern_core::domain::{
    Book, BookStructure, FileType, Highlight, HighlightPatch, NewHighlight,
};
use lectern_core::ports::{BookStore, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `BookStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> PortError {
    PortError::Processing(format!("database error: {e}"))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author: String,
    file_type: String,
    size_bytes: i64,
    cover_image: Option<String>,
    upload_date: DateTime<Utc>,
    last_read: Option<DateTime<Utc>>,
    current_position: Option<Json<serde_json::Value>>,
    structure: Json<BookStructure>,
}

impl BookRecord {
    fn to_domain(self) -> PortResult<Book> {
        let file_type = FileType::from_extension(&self.file_type).ok_or_else(|| {
            PortError::Processing(format!("unknown file type in store: {}", self.file_type))
        })?;
        Ok(Book {
            id: self.id,
            title: self.title,
            author: self.author,
            file_type,
            size_bytes: self.size_bytes as u64,
            cover_image: self.cover_image,
            upload_date: self.upload_date,
            last_read: self.last_read,
            current_position: self.current_position.map(|p| p.0),
            structure: self.structure.0,
        })
    }
}

#[derive(FromRow)]
struct HighlightRecord {
    id: Uuid,
    book_id: Uuid,
    text_content: String,
    start_position: Json<serde_json::Value>,
    end_position: Json<serde_json::Value>,
    color: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl HighlightRecord {
    fn to_domain(self) -> Highlight {
        Highlight {
            id: self.id,
            book_id: self.book_id,
            text_content: self.text_content,
            start_position: self.start_position.0,
            end_position: self.end_position.0,
            color: self.color,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `BookStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookStore for PgStore {
    async fn insert_book(&self, book: Book) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO books (id, title, author, file_type, size_bytes, cover_image, \
             upload_date, last_read, current_position, structure) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.file_type.as_str())
        .bind(book.size_bytes as i64)
        .bind(&book.cover_image)
        .bind(book.upload_date)
        .bind(book.last_read)
        .bind(book.current_position.map(Json))
        .bind(Json(&book.structure))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn list_books(&self) -> PortResult<Vec<Book>> {
        let records: Vec<BookRecord> = sqlx::query_as(
            "SELECT id, title, author, file_type, size_bytes, cover_image, upload_date, \
             last_read, current_position, structure \
             FROM books ORDER BY upload_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        records.into_iter().map(BookRecord::to_domain).collect()
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<Book> {
        let record: Option<BookRecord> = sqlx::query_as(
            "SELECT id, title, author, file_type, size_bytes, cover_image, upload_date, \
             last_read, current_position, structure \
             FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        record
            .ok_or_else(|| PortError::NotFound(format!("book {book_id} not found")))?
            .to_domain()
    }

    async fn update_position(&self, book_id: Uuid, position: serde_json::Value) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE books SET current_position = $2, last_read = $3 WHERE id = $1",
        )
        .bind(book_id)
        .bind(Json(position))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("book {book_id} not found")));
        }
        Ok(())
    }

    async fn delete_book(&self, book_id: Uuid) -> PortResult<()> {
        // Highlights go with the book via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("book {book_id} not found")));
        }
        Ok(())
    }

    async fn create_highlight(&self, highlight: NewHighlight) -> PortResult<Highlight> {
        let record: HighlightRecord = sqlx::query_as(
            "INSERT INTO highlights \
             (id, book_id, text_content, start_position, end_position, color, note, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, book_id, text_content, start_position, end_position, color, note, \
             created_at",
        )
        .bind(Uuid::new_v4())
        .bind(highlight.book_id)
        .bind(&highlight.text_content)
        .bind(Json(highlight.start_position))
        .bind(Json(highlight.end_position))
        .bind(&highlight.color)
        .bind(&highlight.note)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn highlights_for_book(&self, book_id: Uuid) -> PortResult<Vec<Highlight>> {
        let records: Vec<HighlightRecord> = sqlx::query_as(
            "SELECT id, book_id, text_content, start_position, end_position, color, note, \
             created_at \
             FROM highlights WHERE book_id = $1 ORDER BY created_at ASC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(HighlightRecord::to_domain).collect())
    }

    async fn list_highlights(&self) -> PortResult<Vec<Highlight>> {
        let records: Vec<HighlightRecord> = sqlx::query_as(
            "SELECT id, book_id, text_content, start_position, end_position, color, note, \
             created_at \
             FROM highlights ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(HighlightRecord::to_domain).collect())
    }

    async fn update_highlight(
        &self,
        highlight_id: Uuid,
        patch: HighlightPatch,
    ) -> PortResult<Highlight> {
        if patch.is_empty() {
            return Err(PortError::Validation("no fields to update".to_string()));
        }
        let record: Option<HighlightRecord> = sqlx::query_as(
            "UPDATE highlights \
             SET color = COALESCE($2, color), note = COALESCE($3, note) \
             WHERE id = $1 \
             RETURNING id, book_id, text_content, start_position, end_position, color, note, \
             created_at",
        )
        .bind(highlight_id)
        .bind(&patch.color)
        .bind(&patch.note)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        record.map(HighlightRecord::to_domain).ok_or_else(|| {
            PortError::NotFound(format!("highlight {highlight_id} not found"))
        })
    }

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1")
            .bind(highlight_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "highlight {highlight_id} not found"
            )));
        }
        Ok(())
    }
}
