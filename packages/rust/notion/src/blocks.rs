//! Rendering of [`ContentBlock`]s into Notion block objects.

use featuredoc_markdown::{MAX_CHUNK_CHARS, chunk_text};
use featuredoc_shared::ContentBlock;
use serde_json::{Map, Value, json};

/// Rich-text array for `text`, segmented so no text object exceeds the
/// store's per-field limit.
pub fn rich_text(text: &str) -> Value {
    let segments: Vec<Value> = chunk_text(text, MAX_CHUNK_CHARS)
        .into_iter()
        .map(|content| json!({ "type": "text", "text": { "content": content } }))
        .collect();
    Value::Array(segments)
}

/// Notion block object for one content block.
pub fn render_block(block: &ContentBlock) -> Value {
    let block_type = match block {
        ContentBlock::Heading { level: 1, .. } => "heading_1",
        ContentBlock::Heading { level: 2, .. } => "heading_2",
        // Notion stops at heading_3.
        ContentBlock::Heading { .. } => "heading_3",
        ContentBlock::Paragraph { .. } => "paragraph",
        ContentBlock::BulletItem { .. } => "bulleted_list_item",
    };

    let mut object = Map::new();
    object.insert("object".into(), json!("block"));
    object.insert("type".into(), json!(block_type));
    object.insert(
        block_type.into(),
        json!({ "rich_text": rich_text(block.text()) }),
    );
    Value::Object(object)
}

pub fn render_blocks(blocks: &[ContentBlock]) -> Vec<Value> {
    blocks.iter().map(render_block).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_block_type() {
        let rendered = render_blocks(&[
            ContentBlock::heading(1, "Previous State"),
            ContentBlock::heading(3, "Results"),
            ContentBlock::paragraph("N/A"),
            ContentBlock::bullet("reason one"),
        ]);

        assert_eq!(rendered[0]["type"], "heading_1");
        assert_eq!(
            rendered[0]["heading_1"]["rich_text"][0]["text"]["content"],
            "Previous State"
        );
        assert_eq!(rendered[1]["type"], "heading_3");
        assert_eq!(rendered[2]["paragraph"]["rich_text"][0]["text"]["content"], "N/A");
        assert_eq!(rendered[3]["type"], "bulleted_list_item");
        assert_eq!(rendered[3]["object"], "block");
    }

    #[test]
    fn long_bullet_text_is_segmented() {
        let text = "b".repeat(2500);
        let rendered = render_block(&ContentBlock::bullet(text.clone()));
        let segments = rendered["bulleted_list_item"]["rich_text"].as_array().unwrap();
        assert_eq!(segments.len(), 2);
        let joined: String = segments
            .iter()
            .map(|s| s["text"]["content"].as_str().unwrap())
            .collect();
        assert_eq!(joined, text);
    }
}
