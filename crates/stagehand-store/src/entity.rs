use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_model::FieldValue;
use uuid::Uuid;

/// A fabricated entity, either a node or a sub-entity such as a paragraph.
///
/// Field values live in a sorted map keyed by field machine name so that
/// serialized entities are byte-stable across runs with the same seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub bundle: String,
    /// Assigned by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Assigned by the store on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub values: BTreeMap<String, Vec<FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Entity {
    /// An unsaved entity with no values.
    pub fn stub(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            id: None,
            revision_id: None,
            uuid: None,
            label: None,
            values: BTreeMap::new(),
            created: None,
        }
    }

    pub fn set_value(&mut self, field: impl Into<String>, items: Vec<FieldValue>) {
        self.values.insert(field.into(), items);
    }

    pub fn value(&self, field: &str) -> Option<&[FieldValue]> {
        self.values.get(field).map(Vec::as_slice)
    }

    pub fn first_value(&self, field: &str) -> Option<&FieldValue> {
        self.value(field).and_then(|items| items.first())
    }
}

/// Ids handed back by [`crate::EntityStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedEntity {
    pub id: i64,
    pub revision_id: i64,
}
