//! Overlapping word-window chunking.
//!
//! Example with `chunk_size = 5`, `overlap = 2` (step 3):
//! ```text
//! words:   A B C D E F G H I J
//! chunk 0: A B C D E
//! chunk 1:       D E F G H
//! chunk 2:             G H I J
//! ```

use soapbridge_shared::{Chunk, NormalizedText};

/// Default words per window.
pub const DEFAULT_CHUNK_SIZE: usize = 900;

/// Default words shared between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 120;

/// Split text into windows of `chunk_size` whitespace-delimited words,
/// joined with single spaces.
///
/// Window starts advance by `max(1, chunk_size - overlap)`. Emission stops
/// with the first window that reaches the last word, so text of at most
/// `chunk_size` words yields exactly one window. A `chunk_size` of zero is
/// treated as one.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let size = chunk_size.max(1);
    let step = size.saturating_sub(overlap).max(1);

    let mut windows = Vec::with_capacity(words.len().div_ceil(step));
    let mut start = 0;
    while start < words.len() {
        let end = (start + size).min(words.len());
        windows.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    windows
}

/// Chunk one normalized source, assigning ordinals by position.
pub fn chunk_source(source: &NormalizedText, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    chunk_text(&source.text, chunk_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            source_name: source.source_name.clone(),
            text,
            ordinal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    /// Rebuild the word sequence by dropping each window's overlap with
    /// what has already been emitted.
    fn reconstruct(chunks: &[String], chunk_size: usize, overlap: usize) -> Vec<String> {
        let step = chunk_size.saturating_sub(overlap).max(1);
        let mut rebuilt: Vec<String> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let words: Vec<&str> = chunk.split(' ').collect();
            let already = rebuilt.len() - i * step;
            rebuilt.extend(words[already..].iter().map(|w| w.to_string()));
        }
        rebuilt
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 900, 120).is_empty());
        assert!(chunk_text("  \n\t ", 900, 120).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("Use POST  /ship/v1\nto create a shipment.", 900, 120);
        assert_eq!(chunks, vec!["Use POST /ship/v1 to create a shipment."]);
    }

    #[test]
    fn exactly_chunk_size_words_is_one_chunk() {
        let text = numbered_words(900);
        assert_eq!(chunk_text(&text, 900, 120).len(), 1);

        // Between step (780) and chunk_size words: still one window.
        let text = numbered_words(850);
        assert_eq!(chunk_text(&text, 900, 120).len(), 1);
    }

    #[test]
    fn one_word_over_chunk_size_is_two_chunks() {
        let text = numbered_words(901);
        let chunks = chunk_text(&text, 900, 120);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("w780 "));
        assert!(chunks[1].ends_with(" w900"));
    }

    #[test]
    fn windows_overlap_by_configured_words() {
        let chunks = chunk_text("a b c d e f g h i j", 5, 2);
        assert_eq!(chunks, vec!["a b c d e", "d e f g h", "g h i j"]);
    }

    #[test]
    fn overlap_not_smaller_than_size_steps_one_word() {
        let chunks = chunk_text("a b c d e", 3, 5);
        assert_eq!(chunks, vec!["a b c", "b c d", "c d e"]);

        let chunks = chunk_text("a b c d", 2, 2);
        assert_eq!(chunks, vec!["a b", "b c", "c d"]);
    }

    #[test]
    fn zero_chunk_size_is_treated_as_one() {
        let chunks = chunk_text("a b c", 0, 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }

    #[test]
    fn distinct_spans_reconstruct_word_sequence() {
        for (n, size, overlap) in [(1, 3, 1), (10, 5, 2), (37, 7, 3), (2500, 900, 120), (100, 10, 0)] {
            let text = numbered_words(n);
            let chunks = chunk_text(&text, size, overlap);
            let expected: Vec<String> = text.split(' ').map(String::from).collect();
            assert_eq!(
                reconstruct(&chunks, size, overlap),
                expected,
                "n={n} size={size} overlap={overlap}"
            );
            for chunk in &chunks {
                assert!(chunk.split(' ').count() <= size);
            }
        }
    }

    #[test]
    fn chunk_source_assigns_ordinals() {
        let source = NormalizedText {
            source_name: "ship.md".into(),
            text: "a b c d e f g".into(),
        };
        let chunks = chunk_source(&source, 3, 1);
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i);
            assert_eq!(chunk.source_name, "ship.md");
        }
        assert_eq!(chunks[2].text, "e f g");
    }
}
