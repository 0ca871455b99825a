//! Page-creation request assembly.

use featuredoc_shared::{ContentBlock, FeatureDocError, InferredMetadata, Result, StoreSchema};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::blocks::render_blocks;
use crate::properties::build_properties;

/// Most child blocks the store accepts in one creation request.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

/// Body of `POST /v1/pages`.
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest {
    pub parent: PageParent,
    pub properties: Map<String, Value>,
    pub children: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageParent {
    pub database_id: String,
}

/// Assemble the full creation request for one document.
///
/// Rejects block lists the store would refuse, so a page is either created
/// whole or not at all.
pub fn build_page_request(
    database_id: &str,
    meta: &InferredMetadata,
    schema: &StoreSchema,
    blocks: &[ContentBlock],
) -> Result<PageRequest> {
    let properties = build_properties(meta, schema)?;

    if blocks.len() > MAX_CHILDREN_PER_REQUEST {
        return Err(FeatureDocError::StoreWrite(format!(
            "document has {} blocks; a page can be created with at most {MAX_CHILDREN_PER_REQUEST}",
            blocks.len()
        )));
    }

    Ok(PageRequest {
        parent: PageParent {
            database_id: database_id.to_string(),
        },
        properties,
        children: render_blocks(blocks),
    })
}
