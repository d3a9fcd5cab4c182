use thiserror::Error;

use crate::model::PopulateReport;

#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("model error: {0}")]
    Model(#[from] stagehand_model::Error),

    #[error("store error: {0}")]
    Store(#[from] stagehand_store::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("population finished with warnings in strict mode")]
    Failed(PopulateReport),
}
