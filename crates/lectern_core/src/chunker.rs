//! crates/lectern_core/src/chunker.rs
//!
//! Sentence-respecting text segmentation for synthesis.
//!
//! Speech engines behave best on short inputs, so request text is split
//! into bounded chunks before synthesis. Chunk order is significant: the
//! pipeline synthesizes and reassembles audio strictly in the order
//! produced here.

/// Reference chunk bound, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 500;

/// Collapses every whitespace run (spaces, newlines, tabs) into a single
/// space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into ordered, non-empty chunks of at most `max_chars`
/// characters each.
///
/// The text is whitespace-normalized first, then split on `.` sentence
/// boundaries. Sentences are accumulated greedily: a sentence that would
/// push the running chunk past `max_chars` closes the chunk and starts the
/// next one. A single sentence longer than `max_chars` is hard-truncated at
/// the bound (on a char boundary), so no emitted chunk ever exceeds it.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in normalized.split('.') {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let mut piece = format!("{sentence}.");

        if piece.len() > max_chars {
            // Oversized sentence: flush whatever is pending, then truncate.
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            truncate_at_boundary(&mut piece, max_chars);
            chunks.push(piece);
            continue;
        }

        if !current.is_empty() && current.len() + 1 + piece.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Truncates to at most `max_len` bytes without splitting a codepoint.
fn truncate_at_boundary(text: &mut String, max_len: usize) {
    if text.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_runs() {
        assert_eq!(
            normalize_whitespace("one\n\ttwo   three \r\n four"),
            "one two three four"
        );
        assert_eq!(normalize_whitespace("   \n \t "), "");
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 500).is_empty());
        assert!(chunk_text("  \n ", 500).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("Hello there. How are you.", 500);
        assert_eq!(chunks, vec!["Hello there. How are you.".to_string()]);
    }

    #[test]
    fn chunks_respect_sentence_boundaries() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let chunks = chunk_text(text, 45);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 45, "chunk too long: {chunk:?}");
            assert!(chunk.ends_with('.'));
        }
    }

    #[test]
    fn chunk_order_reconstructs_normalized_source() {
        let text = "The quick brown fox. Jumped over the lazy dog.\nThen it\tran away. And never came back again.";
        let chunks = chunk_text(text, 40);
        let rejoined = chunks.join(" ");
        let source_words: Vec<String> = normalize_whitespace(text)
            .split_whitespace()
            .map(|w| w.trim_end_matches('.').to_string())
            .collect();
        let chunk_words: Vec<String> = rejoined
            .split_whitespace()
            .map(|w| w.trim_end_matches('.').to_string())
            .collect();
        assert_eq!(chunk_words, source_words);
    }

    #[test]
    fn oversized_sentence_is_truncated_at_bound() {
        let long = "a".repeat(900);
        let chunks = chunk_text(&long, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 500);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multibyte text must not be cut mid-codepoint.
        let long = "é".repeat(300);
        let chunks = chunk_text(&long, 501);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].len() <= 501);
        assert!(chunks[0].is_char_boundary(chunks[0].len()));
    }

    #[test]
    fn oversized_sentence_flushes_pending_chunk_first() {
        let text = format!("Short one. {}.", "b".repeat(80));
        let chunks = chunk_text(&text, 40);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "Short one.");
        assert_eq!(chunks[1].len(), 40);
    }
}
