use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::summary::Summary;

/// Deserialize with JSON-path context in error messages.
pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| Error::Decode {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

impl Summary {
    /// Decode a summary previously written as JSON.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        from_slice_with_path(bytes)
    }
}
