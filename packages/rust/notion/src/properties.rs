//! Conditional-additive mapping of inferred metadata onto database fields.
//!
//! The title-kind field always receives the document filename. Each
//! [`OptionalField`] is attached only when the schema has a field of exactly
//! that name, and never created otherwise.

use featuredoc_shared::{FeatureDocError, FieldKind, InferredMetadata, Result, StoreSchema};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::blocks::rich_text;

/// Metadata fields written when the destination database defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalField {
    Author,
    TaskId,
    AppArea,
    Project,
    PrUrl,
    CreatedAt,
}

/// Builds a property value for a field of the given kind, or `None` when
/// the kind cannot hold the value.
type PropertyBuilder = fn(&InferredMetadata, FieldKind) -> Option<Value>;

impl OptionalField {
    pub const ALL: [Self; 6] = [
        Self::Author,
        Self::TaskId,
        Self::AppArea,
        Self::Project,
        Self::PrUrl,
        Self::CreatedAt,
    ];

    /// Exact field name looked up in the schema.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::TaskId => "Task ID",
            Self::AppArea => "App Area",
            Self::Project => "Project",
            Self::PrUrl => "PR URL",
            Self::CreatedAt => "Created At",
        }
    }

    fn builder(self) -> PropertyBuilder {
        match self {
            Self::Author => |meta, kind| text_property(&meta.author, kind),
            Self::TaskId => |meta, kind| text_property(&meta.task_id, kind),
            Self::AppArea => |meta, kind| text_property(&meta.app_area, kind),
            Self::Project => |meta, kind| text_property(&meta.project, kind),
            Self::PrUrl => |meta, kind| match kind {
                FieldKind::Url => Some(json!({ "url": meta.pr_url })),
                other => text_property(&meta.pr_url, other),
            },
            Self::CreatedAt => |meta, kind| match kind {
                FieldKind::Date => Some(json!({ "date": { "start": meta.created_at.to_rfc3339() } })),
                other => text_property(&meta.created_at.to_rfc3339(), other),
            },
        }
    }
}

/// Text-valued property shaped for the field's kind.
fn text_property(value: &str, kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::RichText => Some(json!({ "rich_text": rich_text(value) })),
        FieldKind::Select => Some(json!({ "select": { "name": option_name(value) } })),
        FieldKind::MultiSelect => {
            Some(json!({ "multi_select": [{ "name": option_name(value) }] }))
        }
        FieldKind::Url => Some(json!({ "url": value })),
        _ => None,
    }
}

/// Select option names may not contain commas.
fn option_name(value: &str) -> String {
    value.replace(',', " ").trim().to_string()
}

/// Build the page property map for `meta` against `schema`.
///
/// Fails only when the schema has no title-kind field.
pub fn build_properties(meta: &InferredMetadata, schema: &StoreSchema) -> Result<Map<String, Value>> {
    let title_key = schema.title_field().ok_or_else(|| {
        FeatureDocError::schema_mismatch("could not find a title property in the Notion database")
    })?;

    let mut properties = Map::new();
    properties.insert(
        title_key.to_string(),
        json!({ "title": rich_text(&meta.filename) }),
    );

    for field in OptionalField::ALL {
        let name = field.field_name();
        let Some(kind) = schema.kind_of(name) else {
            debug!(field = name, "field absent from schema, skipping");
            continue;
        };
        if name == title_key {
            continue;
        }

        match (field.builder())(meta, kind) {
            Some(value) => {
                properties.insert(name.to_string(), value);
            }
            None => warn!(field = name, ?kind, "field kind cannot hold this value, skipping"),
        }
    }

    Ok(properties)
}
