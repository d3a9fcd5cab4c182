use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::ContentModel;

/// JSON Schema for content model documents.
pub fn model_json_schema() -> RootSchema {
    schema_for!(ContentModel)
}
