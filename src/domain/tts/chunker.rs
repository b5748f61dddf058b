//! Splits long text into backend-sized chunks.
//!
//! Sizes are counted in characters, not bytes. A cut prefers the last space
//! inside the window, then the last sentence or clause mark, and only then
//! falls back to a raw character cut (which can land mid-word).

use super::model::TextChunk;

/// Characters per chunk the backend handles comfortably
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Fragments shorter than this are folded into the previous chunk
pub const MIN_CHUNK_CHARS: usize = 10;

/// Fallback break marks, in priority order
const PUNCTUATION_BREAKS: [char; 5] = ['.', '!', '?', ';', ','];

/// Split text into chunks of at most `max_chars` characters.
///
/// Returns an empty vector for empty or whitespace-only input. A chunk can
/// exceed `max_chars` only when a short trailing fragment was merged into
/// it, so the hard bound is `max_chars + MIN_CHUNK_CHARS`.
pub fn split_text_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());

        if end < chars.len() {
            end = find_break(&chars, start, end);
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        start = end;
    }

    merge_short_chunks(chunks)
}

/// Same as [`split_text_into_chunks`], tagged with each chunk's position
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<TextChunk> {
    split_text_into_chunks(text, max_chars)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text))
        .collect()
}

/// Pick the cut position for the window `[start, end)`.
fn find_break(chars: &[char], start: usize, end: usize) -> usize {
    let window = &chars[start..end];

    if let Some(offset) = window.iter().rposition(|&c| c == ' ') {
        if offset > 0 {
            return start + offset;
        }
    }

    for mark in PUNCTUATION_BREAKS {
        if let Some(offset) = window.iter().rposition(|&c| c == mark) {
            return start + offset + 1;
        }
    }

    end
}

fn merge_short_chunks(chunks: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        match merged.last_mut() {
            Some(previous) if chunk.chars().count() < MIN_CHUNK_CHARS => {
                previous.push(' ');
                previous.push_str(&chunk);
            }
            _ => merged.push(chunk),
        }
    }

    merged
}
