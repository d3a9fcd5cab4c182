use serde::{Deserialize, Serialize};

/// A single stored field value.
///
/// Datetime values are stored as ISO 8601 text, matching how the exporting
/// CMS persists them. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Timestamp(i64),
    Link {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Reference {
        target_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_revision_id: Option<i64>,
    },
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Decimal(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Target id and revision id for reference values.
    pub fn as_reference(&self) -> Option<(i64, Option<i64>)> {
        match self {
            FieldValue::Reference {
                target_id,
                target_revision_id,
            } => Some((*target_id, *target_revision_id)),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, FieldValue::Reference { .. })
    }
}
