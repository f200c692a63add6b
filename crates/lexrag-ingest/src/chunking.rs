//! Text chunking for embedding and retrieval.
//!
//! Two deterministic strategies:
//! - sentence-aware (default, `overlap == 0`): greedy accumulation of
//!   sentences into chunks of at most `max_size` characters;
//! - fixed-window (`overlap > 0`): character windows of `max_size`
//!   advancing by `max_size - overlap`, ignoring sentence boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

use lexrag_core::{Error, Result};

/// Default size bound for a single chunk, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;
/// Default overlap when the fixed-window strategy is selected.
pub const DEFAULT_WINDOW_OVERLAP: usize = 200;

/// End-of-sentence punctuation followed by whitespace.
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Splits text into bounded chunks. Configuration is validated at
/// construction; chunking itself never fails on text content.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::Chunking("max_size must be positive".to_string()));
        }
        if overlap >= max_size {
            return Err(Error::Chunking(format!(
                "overlap ({}) must be smaller than max_size ({})",
                overlap, max_size
            )));
        }
        Ok(Self { max_size, overlap })
    }

    /// Split `text` into ordered chunks. Empty or whitespace-only text
    /// yields an empty sequence.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if self.overlap > 0 {
            self.window_chunks(text)
        } else {
            self.sentence_chunks(text)
        }
    }

    /// Greedy sentence accumulation. A single sentence longer than
    /// `max_size` is emitted as its own oversized chunk rather than
    /// split mid-sentence.
    fn sentence_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buf = String::new();

        for sentence in split_sentences(text) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            if buf.is_empty() {
                buf.push_str(sentence);
            } else if buf.chars().count() + 1 + sentence.chars().count() > self.max_size {
                chunks.push(std::mem::take(&mut buf));
                buf.push_str(sentence);
            } else {
                buf.push(' ');
                buf.push_str(sentence);
            }
        }

        if !buf.is_empty() {
            chunks.push(buf);
        }
        chunks
    }

    /// Fixed character windows with exactly `overlap` characters of
    /// repetition between consecutive windows. Windows are emitted
    /// verbatim, whitespace included; only all-whitespace windows are
    /// dropped.
    fn window_chunks(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.max_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.max_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            if !window.trim().is_empty() {
                chunks.push(window);
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: 0,
        }
    }
}

/// Split at end-of-sentence punctuation followed by whitespace,
/// keeping the punctuation with the preceding sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut prev = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // Punctuation chars here are single-byte; end of sentence is
        // one past the punctuation, the matched whitespace is dropped.
        let end = m.start() + 1;
        sentences.push(&text[prev..end]);
        prev = m.end();
    }
    if prev < text.len() {
        sentences.push(&text[prev..]);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence_chunker(max_size: usize) -> Chunker {
        Chunker::new(max_size, 0).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(Chunker::new(0, 0), Err(Error::Chunking(_))));
        assert!(matches!(Chunker::new(100, 100), Err(Error::Chunking(_))));
        assert!(matches!(Chunker::new(100, 150), Err(Error::Chunking(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("The court ruled in favor. The appeal was denied.");
        assert_eq!(chunks, vec!["The court ruled in favor. The appeal was denied."]);
    }

    #[test]
    fn test_sentences_accumulate_up_to_max_size() {
        let chunker = sentence_chunker(50);
        let chunks = chunker.chunk("One short sentence. Another short one. A third sentence here.");
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn test_no_content_loss() {
        let text = "First clause applies. Second clause governs! Does the third apply? Fourth stands.";
        let chunker = sentence_chunker(30);
        let chunks = chunker.chunk(text);
        let rejoined = chunks.join(" ");
        for sentence in ["First clause applies.", "Second clause governs!", "Does the third apply?", "Fourth stands."] {
            assert!(rejoined.contains(sentence), "missing {:?}", sentence);
        }
    }

    #[test]
    fn test_oversized_sentence_emitted_whole() {
        let long_sentence = format!("{}.", "w".repeat(120));
        let text = format!("Short one. {} Short two.", long_sentence);
        let chunker = sentence_chunker(50);
        let chunks = chunker.chunk(&text);
        assert!(chunks.contains(&long_sentence), "oversized sentence must not be split");
    }

    #[test]
    fn test_twelve_hundred_chars_make_two_chunks() {
        // Twelve ~100-char sentences: 999 chars fit the first chunk,
        // the remaining two sentences form the second.
        let sentence = format!("{}.", "a".repeat(98));
        let text = std::iter::repeat(sentence)
            .take(12)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(text.chars().count(), 1199);

        let chunker = sentence_chunker(1000);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].chars().count() <= 1000);
    }

    #[test]
    fn test_window_strategy_overlaps() {
        let text: String = ('a'..='z').cycle().take(250).collect();
        let chunker = Chunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);
        // Windows advance by 80: starts at 0, 80, 160, 240.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 100);
        // Tail of window n repeats at the head of window n+1.
        assert_eq!(&chunks[0][80..], &chunks[1][..20]);
    }

    #[test]
    fn test_window_overlap_exact_across_whitespace() {
        // Spaces landing on window boundaries must still repeat exactly.
        let text: String = "abcd ".repeat(50);
        let chunker = Chunker::new(100, 20).unwrap();
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(80).collect();
            let head: String = pair[1].chars().take(tail.chars().count()).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_deterministic_output() {
        let text = "Clause one applies. Clause two applies. Clause three applies.";
        let chunker = sentence_chunker(40);
        assert_eq!(chunker.chunk(text), chunker.chunk(text));
    }
}
