use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Storage type of a field, mirroring the type names a CMS export would use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    StringLong,
    TextLong,
    Integer,
    Decimal,
    Float,
    Boolean,
    Datetime,
    Timestamp,
    Email,
    Link,
    Telephone,
    ListString,
    Reference,
    ReferenceRevisions,
}

impl FieldType {
    /// True for the reference types that point at other entities.
    pub fn is_reference(self) -> bool {
        matches!(self, FieldType::Reference | FieldType::ReferenceRevisions)
    }

    /// True for types whose values are stored as text and honor `max_length`.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::StringLong
                | FieldType::TextLong
                | FieldType::Email
                | FieldType::Link
                | FieldType::Telephone
        )
    }
}

/// How many values a field holds. Serialized as an integer where `-1` means
/// unlimited, matching the storage convention of the exporting CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Limited(u32),
    Unlimited,
}

impl Cardinality {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Cardinality::Unlimited)
    }

    /// The fixed value count, or `None` for unlimited fields.
    pub fn limit(self) -> Option<u32> {
        match self {
            Cardinality::Limited(count) => Some(count),
            Cardinality::Unlimited => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Cardinality::Limited(count) => count as i32,
            Cardinality::Unlimited => -1,
        }
    }

    pub fn from_i32(raw: i32) -> std::result::Result<Self, String> {
        match raw {
            -1 => Ok(Cardinality::Unlimited),
            count if count >= 1 => Ok(Cardinality::Limited(count as u32)),
            other => Err(format!(
                "cardinality must be -1 (unlimited) or a positive integer, got {other}"
            )),
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::Limited(1)
    }
}

impl Serialize for Cardinality {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i32::deserialize(deserializer)?;
        Cardinality::from_i32(raw).map_err(serde::de::Error::custom)
    }
}

/// Target selection settings for reference fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceSettings {
    /// Entity type the field points at.
    pub target_type: String,
    /// Allowed target bundles. Absent means every bundle of the target type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bundles: Option<Vec<String>>,
    /// When set, `target_bundles` is an exclusion list instead of an allow list.
    #[serde(default)]
    pub negate: bool,
}

/// A single field attached to a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDefinition {
    /// Machine name, e.g. `field_components`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub field_type: FieldType,
    #[serde(default)]
    #[schemars(with = "i32")]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
    /// Base fields belong to the entity type itself and are never populated
    /// with sample data.
    #[serde(default)]
    pub base_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Options for `list_string` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Present on reference fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSettings>,
}
