//! crates/lectern_core/src/ingest/epub.rs
//!
//! EPUB container normalization: Dublin-Core metadata, cover discovery and
//! spine-ordered chapter extraction.

use std::io::{Cursor, Read, Seek};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use epub::doc::EpubDoc;
use tracing::{debug, warn};

use super::{markup, IngestedBook, MIN_CHAPTER_CHARS};
use crate::domain::{BookStructure, Chapter, FileType};
use crate::ports::{PortError, PortResult};

pub fn ingest_epub(bytes: &[u8], filename: &str) -> PortResult<IngestedBook> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut doc = EpubDoc::from_reader(cursor)
        .map_err(|e| PortError::Processing(format!("failed to open EPUB container: {e}")))?;

    let title = doc
        .mdata("title")
        .map(|t| t.value.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| filename.to_string());
    let author = doc
        .mdata("creator")
        .map(|a| a.value.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Unknown Author".to_string());

    let cover_image = extract_cover(&mut doc);

    // Walk the spine in declaration order; items whose stripped text is too
    // short are navigation or boilerplate fragments and get dropped.
    let mut chapters = Vec::new();
    let mut item_index = 0usize;
    loop {
        if let Some((html, _mime)) = doc.get_current_str() {
            item_index += 1;
            let content = markup::html_to_text(&html);
            if content.chars().count() > MIN_CHAPTER_CHARS {
                let id = doc
                    .get_current_id()
                    .unwrap_or_else(|| format!("item{item_index}"));
                let chapter_title = markup::extract_title(&html)
                    .unwrap_or_else(|| "Untitled Chapter".to_string());
                let word_count = content.split_whitespace().count();
                chapters.push(Chapter {
                    id,
                    title: chapter_title,
                    content,
                    word_count,
                });
            } else {
                debug!(item = item_index, "skipping short spine item");
            }
        }
        if !doc.go_next() {
            break;
        }
    }

    Ok(IngestedBook {
        title,
        author,
        file_type: FileType::Epub,
        size_bytes: bytes.len() as u64,
        cover_image,
        structure: BookStructure::Chapters(chapters),
    })
}

/// Pulls the dedicated cover item, or else the first embedded image in the
/// manifest. Failure is never fatal: the book ingests without a cover.
fn extract_cover<R: Read + Seek>(doc: &mut EpubDoc<R>) -> Option<String> {
    if let Some((data, _mime)) = doc.get_cover() {
        return Some(BASE64.encode(data));
    }

    // Manifest order is a hash map; sort ids so the fallback pick is
    // deterministic across re-ingestions of the same bytes.
    let mut image_ids: Vec<String> = doc
        .resources
        .iter()
        .filter(|(_, item)| item.mime.starts_with("image/"))
        .map(|(id, _)| id.clone())
        .collect();
    image_ids.sort();

    let id = image_ids.into_iter().next()?;
    match doc.get_resource(&id) {
        Some((data, _mime)) => Some(BASE64.encode(data)),
        None => {
            warn!(item = %id, "cover fallback image could not be read");
            None
        }
    }
}
