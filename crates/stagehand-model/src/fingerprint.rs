use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::ContentModel;

/// Computes the hex digest of a model's canonical JSON form.
///
/// The stored `model_fingerprint` field is cleared before hashing so a model
/// fingerprints the same whether or not it already carries one.
pub fn model_fingerprint(model: &ContentModel) -> Result<String> {
    let mut canonical = model.clone();
    canonical.model_fingerprint = None;
    let bytes = serde_json::to_vec(&canonical).map_err(|err| Error::Other(err.to_string()))?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}
