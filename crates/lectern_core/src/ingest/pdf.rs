//! crates/lectern_core/src/ingest/pdf.rs
//!
//! PDF normalization: per-page text extraction in document order plus
//! document-info metadata with the shared defaults.

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use super::IngestedBook;
use crate::domain::{BookStructure, FileType, Page};
use crate::ports::{PortError, PortResult};

pub fn ingest_pdf(bytes: &[u8], filename: &str) -> PortResult<IngestedBook> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| PortError::Processing(format!("failed to parse PDF container: {e}")))?;

    let title = info_string(&doc, b"Title").unwrap_or_else(|| filename.to_string());
    let author = info_string(&doc, b"Author").unwrap_or_else(|| "Unknown Author".to_string());

    // Blank and unreadable pages are dropped; survivors are renumbered so
    // page numbers stay contiguous from 1.
    let mut pages = Vec::new();
    for (page_number, _object_id) in doc.get_pages() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = page_number, "skipping unreadable page: {e}");
                continue;
            }
        };
        let content = text.trim().to_string();
        if content.is_empty() {
            continue;
        }
        let word_count = content.split_whitespace().count();
        pages.push(Page {
            page_number: pages.len() + 1,
            content,
            word_count,
        });
    }

    Ok(IngestedBook {
        title,
        author,
        file_type: FileType::Pdf,
        size_bytes: bytes.len() as u64,
        cover_image: None,
        structure: BookStructure::Pages(pages),
    })
}

/// Reads a text entry from the trailer Info dictionary, best effort.
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let dict: &Dictionary = match info {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let decoded = decode_pdf_text(bytes);
            (!decoded.is_empty()).then_some(decoded)
        }
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE with a BOM or a byte encoding we
/// read as UTF-8, lossily.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units).trim().to_string()
    } else {
        String::from_utf8_lossy(bytes).trim().to_string()
    }
}
