//! Caller options for `start_reading`
//!
//! Field names follow the host bridge's JSON (`bacKey`, `includeImages`,
//! `extraFiles`). Every field is optional at this layer so the core can
//! report a missing BAC key itself instead of failing deserialization.

use serde::{Deserialize, Serialize};

/// BAC key fields as supplied by the caller. All three are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacKeyOptions {
    pub document_no: Option<String>,
    pub expiry_date: Option<String>,
    pub birth_date: Option<String>,
}

/// Options for a single read session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOptions {
    pub bac_key: Option<BacKeyOptions>,
    pub include_images: Option<bool>,
    pub extra_files: Option<Vec<String>>,
}

impl ReadOptions {
    /// Whether face/fingerprint images were requested (defaults to false)
    pub fn include_images(&self) -> bool {
        self.include_images.unwrap_or(false)
    }

    /// Extra file names in caller order (defaults to empty)
    pub fn extra_files(&self) -> &[String] {
        self.extra_files.as_deref().unwrap_or(&[])
    }
}
