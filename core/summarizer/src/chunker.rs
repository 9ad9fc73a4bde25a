//! Splits long text into overlapping chunks for map-reduce summarization.

/// Splits `text` into chunks of at most `chunk_chars` characters, each
/// overlapping the previous one by `overlap_chars` characters so a detail
/// straddling a chunk boundary survives in at least one chunk. Splits land on
/// char boundaries, never mid-codepoint.
pub fn chunk_text(text: &str, chunk_chars: usize, overlap_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_chars {
        return vec![text.to_string()];
    }

    let overlap_chars = overlap_chars.min(chunk_chars.saturating_sub(1));
    let stride = chunk_chars - overlap_chars;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let len = text.len();
    while start < len {
        let mut end = (start + chunk_chars).min(len);
        while end < len && !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(text[start..end].to_string());
        if end == len {
            break;
        }
        let mut next_start = start + stride;
        while next_start < len && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        if next_start <= start {
            next_start = end;
        }
        start = next_start;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("hello world", 100, 10);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn long_text_splits_with_overlap() {
        let text = "a".repeat(25);
        let chunks = chunk_text(&text, 10, 3);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        // last chunk reaches the end of the text
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 10, 2).is_empty());
    }
}
