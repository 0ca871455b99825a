//! Markdown-to-block conversion for generated feature documents.
//!
//! Model output is parsed with a deliberately small grammar: `#`, `##`, `###`
//! headings, `- ` bullets, and plain lines. Everything else (nested lists,
//! emphasis, links, tables, code fences) passes through as paragraph text.
//! A chunking pass then keeps each paragraph under the store's field limit.

mod chunk;

use std::sync::LazyLock;

use featuredoc_shared::{BlockMode, ContentBlock};
use regex::Regex;
use tracing::{debug, instrument};

pub use chunk::{MAX_CHUNK_CHARS, chunk_paragraphs, chunk_text, split_paragraphs};

/// Matches a `- ` bullet marker with optional leading indentation.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*- (.*)$").expect("bullet regex"));

/// Heading prefixes, longest first so `### ` is not read as `# `.
const HEADING_PREFIXES: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

/// Convert model output into content blocks using the configured strategy.
pub fn convert(md: &str, mode: BlockMode) -> Vec<ContentBlock> {
    match mode {
        BlockMode::Structured => markdown_to_blocks(md),
        BlockMode::Paragraphs => paragraph_blocks(md),
    }
}

/// Line-classify `md` into headings, bullets, and paragraphs, then split
/// oversized paragraphs.
#[instrument(skip(md), fields(len = md.len()))]
pub fn markdown_to_blocks(md: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut in_list = false;
    let mut list_runs = 0usize;

    for line in md.lines() {
        if line.trim().is_empty() {
            in_list = false;
            continue;
        }

        if let Some(block) = classify_heading(line) {
            in_list = false;
            blocks.push(block);
            continue;
        }

        if let Some(caps) = BULLET_RE.captures(line) {
            if !in_list {
                list_runs += 1;
                in_list = true;
            }
            blocks.push(ContentBlock::bullet(caps[1].trim_end()));
            continue;
        }

        in_list = false;
        blocks.push(ContentBlock::paragraph(line));
    }

    let blocks = chunk_paragraphs(blocks);
    debug!(blocks = blocks.len(), list_runs, "markdown converted to blocks");
    blocks
}

/// Treat every blank-line-delimited paragraph as one paragraph block.
pub fn paragraph_blocks(md: &str) -> Vec<ContentBlock> {
    split_paragraphs(md)
        .into_iter()
        .map(ContentBlock::paragraph)
        .collect()
}

fn classify_heading(line: &str) -> Option<ContentBlock> {
    HEADING_PREFIXES.iter().find_map(|(prefix, level)| {
        line.strip_prefix(*prefix)
            .map(|rest| ContentBlock::heading(*level, rest.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_document_scenario() {
        let md = "# Previous State\nN/A\n\n## Why\n- reason one\n- reason two";
        assert_eq!(
            markdown_to_blocks(md),
            vec![
                ContentBlock::heading(1, "Previous State"),
                ContentBlock::paragraph("N/A"),
                ContentBlock::heading(2, "Why"),
                ContentBlock::bullet("reason one"),
                ContentBlock::bullet("reason two"),
            ]
        );
    }

    #[test]
    fn heading_levels_are_not_confused() {
        let blocks = markdown_to_blocks("### Results\n## Decision\n# Title\n#### Deep\n#nospace");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::heading(3, "Results"),
                ContentBlock::heading(2, "Decision"),
                ContentBlock::heading(1, "Title"),
                ContentBlock::paragraph("#### Deep"),
                ContentBlock::paragraph("#nospace"),
            ]
        );
    }

    #[test]
    fn indented_bullets_and_unsupported_syntax() {
        let md = "  - indented item\n* star item\n1. numbered\n```rust\n| a | b |\n**bold** [link](https://x)";
        let blocks = markdown_to_blocks(md);
        assert_eq!(blocks[0], ContentBlock::bullet("indented item"));
        assert_eq!(blocks[1], ContentBlock::paragraph("* star item"));
        assert_eq!(blocks[2], ContentBlock::paragraph("1. numbered"));
        assert_eq!(blocks[3], ContentBlock::paragraph("```rust"));
        assert_eq!(blocks[4], ContentBlock::paragraph("| a | b |"));
        assert_eq!(blocks[5], ContentBlock::paragraph("**bold** [link](https://x)"));
    }

    #[test]
    fn line_order_and_content_are_preserved() {
        let md = "# Previous State\nThe cache was absent.\n\n## What Was Done\n- Added store\n  - nested is flat\nSee https://github.com/acme/shop/pull/42\n\n\n### Results\nFaster.";
        let expected: Vec<&str> = vec![
            "Previous State",
            "The cache was absent.",
            "What Was Done",
            "Added store",
            "nested is flat",
            "See https://github.com/acme/shop/pull/42",
            "Results",
            "Faster.",
        ];
        let texts: Vec<String> = markdown_to_blocks(md)
            .iter()
            .map(|b| b.text().to_string())
            .collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn crlf_and_blank_input() {
        assert!(markdown_to_blocks("").is_empty());
        assert!(markdown_to_blocks("\n \n\t\n").is_empty());
        let blocks = markdown_to_blocks("## Results\r\n- done\r\n");
        assert_eq!(
            blocks,
            vec![ContentBlock::heading(2, "Results"), ContentBlock::bullet("done")]
        );
    }

    #[test]
    fn long_paragraph_line_is_chunked_in_place() {
        let long = "z".repeat(1801);
        let md = format!("# Head\n{long}\n- tail");
        let blocks = markdown_to_blocks(&md);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].text().len(), 1800);
        assert_eq!(blocks[2].text(), "z");
        assert_eq!(blocks[3], ContentBlock::bullet("tail"));
    }

    #[test]
    fn paragraph_mode_ignores_structure() {
        let md = "# Previous State\nN/A\n\n## Why\n- reason one";
        let blocks = convert(md, BlockMode::Paragraphs);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::paragraph("# Previous State\nN/A"),
                ContentBlock::paragraph("## Why\n- reason one"),
            ]
        );
        assert_eq!(convert(md, BlockMode::Structured).len(), 4);
    }
}
