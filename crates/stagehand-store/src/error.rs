use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
}
