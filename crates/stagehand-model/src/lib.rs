//! Content-model contracts shared across the stagehand workspace.
//!
//! A [`ContentModel`] describes the entity types, bundles, and field
//! definitions of a target site. The population engine consumes it to decide
//! what to fabricate; the recipe crate validates recipes against it.

mod error;
mod field;
mod fingerprint;
mod model;
mod schema;
mod validation;
mod value;

pub use error::{Error, Result};
pub use field::{Cardinality, FieldDefinition, FieldType, ReferenceSettings};
pub use fingerprint::model_fingerprint;
pub use model::{BundleDef, ContentModel, EntityTypeDef};
pub use schema::model_json_schema;
pub use validation::validate_model;
pub use value::FieldValue;

/// Version stamp carried by every serialized content model document.
pub const MODEL_VERSION: &str = "0.1";
