//! Sliding-window word chunker.

/// Split `text` into overlapping chunks of at most `chunk_size` words.
///
/// Words are whitespace-delimited; each emitted chunk is its window's words
/// joined by single spaces. Consecutive windows share `chunk_overlap` words.
/// The window stops advancing when it would not move past the current end
/// (overlap >= chunk size), so the sequence is always finite.
///
/// Empty or whitespace-only input yields an empty vec; callers treat that as
/// an ingestion failure.
pub fn split_words(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let total = words.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        let chunk_text = words[start..end].join(" ");
        if !chunk_text.trim().is_empty() {
            chunks.push(chunk_text);
        }
        if end == total {
            break;
        }
        let next = end.saturating_sub(chunk_overlap);
        if next <= start {
            // Overlap >= chunk size would re-emit the same window forever.
            break;
        }
        start = next;
    }

    chunks
}
