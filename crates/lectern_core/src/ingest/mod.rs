//! crates/lectern_core/src/ingest/mod.rs
//!
//! The ingestion normalizer: validates an uploaded file and parses it into
//! the canonical book structure (chapters for EPUB, pages for PDF).
//!
//! Validation failures are `PortError::Validation` and happen before any
//! parsing side effects; a container that passes validation but cannot be
//! parsed surfaces as `PortError::Processing`. Extraction is deterministic:
//! identical bytes always produce identical structure and word counts.

mod epub;
mod markup;
mod pdf;

use std::ffi::OsStr;
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Book, BookStructure, FileType};
use crate::ports::{PortError, PortResult};

/// Uploads above this size are rejected outright.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Spine items whose stripped text is at or below this length are treated
/// as navigation or boilerplate and dropped.
const MIN_CHAPTER_CHARS: usize = 100;

/// The output of a successful ingestion, before identity is assigned.
#[derive(Debug, Clone)]
pub struct IngestedBook {
    pub title: String,
    pub author: String,
    pub file_type: FileType,
    pub size_bytes: u64,
    pub cover_image: Option<String>,
    pub structure: BookStructure,
}

impl IngestedBook {
    /// Assigns a fresh identity and upload timestamp, producing the
    /// library record to persist.
    pub fn into_book(self) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: self.title,
            author: self.author,
            file_type: self.file_type,
            size_bytes: self.size_bytes,
            cover_image: self.cover_image,
            upload_date: Utc::now(),
            last_read: None,
            current_position: None,
            structure: self.structure,
        }
    }
}

/// Validates and normalizes one uploaded file.
pub fn ingest_upload(bytes: &[u8], filename: &str) -> PortResult<IngestedBook> {
    let extension = Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| PortError::Validation("filename has no extension".to_string()))?;

    let file_type = FileType::from_extension(extension).ok_or_else(|| {
        PortError::Validation(format!(
            "unsupported file type '{extension}' (only EPUB and PDF are supported)"
        ))
    })?;

    if bytes.is_empty() {
        return Err(PortError::Validation("empty file".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(PortError::Validation(
            "file too large (max 100 MiB)".to_string(),
        ));
    }

    match file_type {
        FileType::Epub => epub::ingest_epub(bytes, filename),
        FileType::Pdf => pdf::ingest_pdf(bytes, filename),
    }
}
