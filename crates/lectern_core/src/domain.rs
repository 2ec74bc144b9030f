//! crates/lectern_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport format;
//! they carry `serde` derives only because the structural content of a
//! book is persisted as a JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The supported upload container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Epub,
    Pdf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Epub => "epub",
            FileType::Pdf => "pdf",
        }
    }

    /// Maps a filename extension onto a known format, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "epub" => Some(FileType::Epub),
            "pdf" => Some(FileType::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chapter extracted from an EPUB container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// The container item id; unique within one book.
    pub id: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
}

/// A single non-blank page extracted from a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based and contiguous across the book; blank pages are dropped
    /// before numbering.
    pub page_number: usize,
    pub content: String,
    pub word_count: usize,
}

/// The structural content of a book. The file type determines which
/// variant is populated; a book never carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStructure {
    Chapters(Vec<Chapter>),
    Pages(Vec<Page>),
}

impl BookStructure {
    /// Number of structural units (chapters or pages).
    pub fn unit_count(&self) -> usize {
        match self {
            BookStructure::Chapters(chapters) => chapters.len(),
            BookStructure::Pages(pages) => pages.len(),
        }
    }

    /// Sum of every unit's word count.
    pub fn total_words(&self) -> usize {
        match self {
            BookStructure::Chapters(chapters) => chapters.iter().map(|c| c.word_count).sum(),
            BookStructure::Pages(pages) => pages.iter().map(|p| p.word_count).sum(),
        }
    }
}

/// Represents one uploaded book in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub file_type: FileType,
    pub size_bytes: u64,
    /// Base64-encoded cover image, when the container provided one.
    pub cover_image: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub last_read: Option<DateTime<Utc>>,
    /// Opaque structural locator (chapter id, or page number plus
    /// sub-offset). Not validated against the structure after write time.
    pub current_position: Option<Value>,
    pub structure: BookStructure,
}

impl Book {
    pub fn unit_count(&self) -> usize {
        self.structure.unit_count()
    }

    pub fn total_words(&self) -> usize {
        self.structure.total_words()
    }

    /// The name of the backing file under the upload root.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.file_type)
    }
}

/// The default highlight color, used when a creation request omits one.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#ffff00";

/// A saved highlight anchored to a region of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: Uuid,
    pub book_id: Uuid,
    pub text_content: String,
    /// Free-form locators; referential integrity against the book's
    /// structure is not enforced after creation.
    pub start_position: Value,
    pub end_position: Value,
    /// Hex color string, e.g. `#ffff00`.
    pub color: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a highlight.
#[derive(Debug, Clone)]
pub struct NewHighlight {
    pub book_id: Uuid,
    pub text_content: String,
    pub start_position: Value,
    pub end_position: Value,
    pub color: String,
    pub note: Option<String>,
}

/// A partial update to an existing highlight. At least one field must be
/// present; the store ports leave that check to the operation layer.
#[derive(Debug, Clone, Default)]
pub struct HighlightPatch {
    pub color: Option<String>,
    pub note: Option<String>,
}

impl HighlightPatch {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.note.is_none()
    }
}
