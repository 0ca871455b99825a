//! Size limiting for text destined for the knowledge-base store.
//!
//! The store rejects single text fields over 2000 characters; everything
//! here slices at a conservative [`MAX_CHUNK_CHARS`].

use std::sync::LazyLock;

use featuredoc_shared::ContentBlock;
use regex::Regex;

/// Largest run of characters placed in one text field.
pub const MAX_CHUNK_CHARS: usize = 1800;

/// Slice `text` into contiguous runs of at most `max_chars` characters.
///
/// Counts Unicode scalar values, so a slice never splits a code point.
/// Concatenating the result reproduces `text` exactly; empty input yields
/// no chunks.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "chunk size must be positive");

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}

/// Replace every oversized paragraph with consecutive paragraph chunks.
///
/// Headings and bullets pass through untouched; their text is segmented
/// when rendered into store payloads.
pub fn chunk_paragraphs(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut out = Vec::with_capacity(blocks.len());

    for block in blocks {
        match block {
            ContentBlock::Paragraph { text } if text.chars().count() > MAX_CHUNK_CHARS => {
                out.extend(
                    chunk_text(&text, MAX_CHUNK_CHARS)
                        .into_iter()
                        .map(ContentBlock::paragraph),
                );
            }
            other => out.push(other),
        }
    }

    out
}

/// Split a whole document on blank lines into trimmed, non-empty,
/// size-limited paragraphs.
pub fn split_paragraphs(md: &str) -> Vec<String> {
    static BLANK_LINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid regex"));

    BLANK_LINE_RE
        .split(md)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .flat_map(|p| chunk_text(p, MAX_CHUNK_CHARS))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", MAX_CHUNK_CHARS), vec!["hello".to_string()]);
        assert!(chunk_text("", MAX_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let text = "a".repeat(3600);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() == 1800));
    }

    #[test]
    fn chunk_count_is_ceiling_and_concatenates_back() {
        for len in [1801usize, 2500, 5401, 9000] {
            let text: String = (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect();
            let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
            assert_eq!(chunks.len(), len.div_ceil(MAX_CHUNK_CHARS), "len {len}");
            assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
            assert_eq!(chunks.concat(), text);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(2000);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1800);
        assert_eq!(chunks[1].chars().count(), 200);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn only_long_paragraphs_are_split() {
        let long = "x".repeat(4000);
        let blocks = vec![
            ContentBlock::heading(1, "Results"),
            ContentBlock::paragraph(long.clone()),
            ContentBlock::bullet("y".repeat(1900)),
        ];
        let out = chunk_paragraphs(blocks);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], ContentBlock::heading(1, "Results"));
        let rejoined: String = out[1..4].iter().map(|b| b.text()).collect();
        assert_eq!(rejoined, long);
        assert!(matches!(out[4], ContentBlock::BulletItem { .. }));
    }

    #[test]
    fn split_paragraphs_drops_blank_runs() {
        let md = "First para\nstill first\n\n\n  Second  \r\n\r\nThird\n   \nFourth";
        let paras = split_paragraphs(md);
        assert_eq!(
            paras,
            vec![
                "First para\nstill first".to_string(),
                "Second".to_string(),
                "Third".to_string(),
                "Fourth".to_string(),
            ]
        );
    }
}
