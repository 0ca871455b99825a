//! Database introspection payloads.

use std::collections::BTreeMap;

use featuredoc_shared::{FieldKind, StoreSchema};
use serde::Deserialize;

/// `GET /v1/databases/{id}`, reduced to the property map.
#[derive(Debug, Deserialize)]
pub(crate) struct DatabaseRecord {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyRecord {
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl From<DatabaseRecord> for StoreSchema {
    fn from(record: DatabaseRecord) -> Self {
        StoreSchema::new(
            record
                .properties
                .into_iter()
                .map(|(name, property)| (name, property.kind)),
        )
    }
}
