use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::field::FieldDefinition;

/// Top-level description of a site's content structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentModel {
    /// Contract version, see [`crate::MODEL_VERSION`].
    pub model_version: String,
    /// Optional identifier of the site the model was exported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub entity_types: Vec<EntityTypeDef>,
    /// Hex digest of the model content, used to pin recipes to an export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_fingerprint: Option<String>,
}

/// One entity type, e.g. `node` or `paragraph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityTypeDef {
    pub name: String,
    /// Base field holding the entity label, when the type has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
    /// Whether saves produce revision ids.
    #[serde(default)]
    pub revisionable: bool,
    pub bundles: Vec<BundleDef>,
}

/// One bundle of an entity type, e.g. the `landing_page` node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BundleDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl ContentModel {
    pub fn entity_type(&self, name: &str) -> Option<&EntityTypeDef> {
        self.entity_types.iter().find(|def| def.name == name)
    }

    pub fn bundle(&self, entity_type: &str, bundle: &str) -> Option<&BundleDef> {
        self.entity_type(entity_type)
            .and_then(|def| def.bundle(bundle))
    }
}

impl EntityTypeDef {
    pub fn bundle(&self, name: &str) -> Option<&BundleDef> {
        self.bundles.iter().find(|def| def.name == name)
    }

    /// Bundle machine names in declaration order.
    pub fn bundle_names(&self) -> Vec<&str> {
        self.bundles.iter().map(|def| def.name.as_str()).collect()
    }
}

impl BundleDef {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|def| def.name == name)
    }
}
