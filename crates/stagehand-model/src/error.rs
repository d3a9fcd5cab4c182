use thiserror::Error;

/// Errors surfaced while loading or validating content models.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("unknown bundle: {0}.{1}")]
    UnknownBundle(String, String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
