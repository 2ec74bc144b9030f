//! services/api/src/adapters/memory_store.rs
//!
//! An in-memory implementation of the `BookStore` port, used when no
//! `DATABASE_URL` is configured. Nothing survives a restart; the sort
//! orders and not-found behavior match the PostgreSQL adapter exactly.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use lectern_core::domain::{Book, Highlight, HighlightPatch, NewHighlight};
use lectern_core::ports::{BookStore, PortError, PortResult};

#[derive(Default)]
struct Inner {
    books: HashMap<Uuid, Book>,
    highlights: HashMap<Uuid, Highlight>,
}

/// A volatile `BookStore` backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert_book(&self, book: Book) -> PortResult<()> {
        self.inner.write().await.books.insert(book.id, book);
        Ok(())
    }

    async fn list_books(&self) -> PortResult<Vec<Book>> {
        let inner = self.inner.read().await;
        let mut books: Vec<Book> = inner.books.values().cloned().collect();
        books.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(books)
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<Book> {
        self.inner
            .read()
            .await
            .books
            .get(&book_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("book {book_id} not found")))
    }

    async fn update_position(&self, book_id: Uuid, position: Value) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        let book = inner
            .books
            .get_mut(&book_id)
            .ok_or_else(|| PortError::NotFound(format!("book {book_id} not found")))?;
        book.current_position = Some(position);
        book.last_read = Some(Utc::now());
        Ok(())
    }

    async fn delete_book(&self, book_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        if inner.books.remove(&book_id).is_none() {
            return Err(PortError::NotFound(format!("book {book_id} not found")));
        }
        inner.highlights.retain(|_, h| h.book_id != book_id);
        Ok(())
    }

    async fn create_highlight(&self, highlight: NewHighlight) -> PortResult<Highlight> {
        let record = Highlight {
            id: Uuid::new_v4(),
            book_id: highlight.book_id,
            text_content: highlight.text_content,
            start_position: highlight.start_position,
            end_position: highlight.end_position,
            color: highlight.color,
            note: highlight.note,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .highlights
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn highlights_for_book(&self, book_id: Uuid) -> PortResult<Vec<Highlight>> {
        let inner = self.inner.read().await;
        let mut highlights: Vec<Highlight> = inner
            .highlights
            .values()
            .filter(|h| h.book_id == book_id)
            .cloned()
            .collect();
        highlights.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(highlights)
    }

    async fn list_highlights(&self) -> PortResult<Vec<Highlight>> {
        let inner = self.inner.read().await;
        let mut highlights: Vec<Highlight> = inner.highlights.values().cloned().collect();
        highlights.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(highlights)
    }

    async fn update_highlight(
        &self,
        highlight_id: Uuid,
        patch: HighlightPatch,
    ) -> PortResult<Highlight> {
        if patch.is_empty() {
            return Err(PortError::Validation("no fields to update".to_string()));
        }
        let mut inner = self.inner.write().await;
        let highlight = inner.highlights.get_mut(&highlight_id).ok_or_else(|| {
            PortError::NotFound(format!("highlight {highlight_id} not found"))
        })?;
        if let Some(color) = patch.color {
            highlight.color = color;
        }
        if let Some(note) = patch.note {
            highlight.note = Some(note);
        }
        Ok(highlight.clone())
    }

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        if inner.highlights.remove(&highlight_id).is_none() {
            return Err(PortError::NotFound(format!(
                "highlight {highlight_id} not found"
            )));
        }
        Ok(())
    }
}
