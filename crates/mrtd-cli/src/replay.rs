//! Replay reader - serves a captured document from a JSON file
//!
//! Lets the full session pipeline run without a chip on the reader. The
//! capture is checked against the session's access key the way a chip
//! would reject a wrong BAC key, and only requested groups are returned.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mrtd_card::{
    AccessKey, DataGroupId, DataGroupRequest, PassportDocument, PassportReader, ProgressSink,
    ReadError, ReadProgressEvent,
};
use mrtd_common::{Date6, DateKind};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while loading a capture file
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read capture: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed capture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("data group {file} is not valid hex: {source}")]
    Hex {
        file: String,
        source: hex::FromHexError,
    },

    #[error("photo is not valid base64: {0}")]
    Photo(#[from] base64::DecodeError),
}

/// On-disk capture format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Capture {
    document_number: String,
    date_of_birth: String,
    date_of_expiry: String,
    gender: String,
    personal_number: Option<String>,
    nationality: String,
    mrz: String,
    first_name: String,
    last_name: String,
    place_of_birth: Option<String>,
    /// Base64 image bytes
    photo: Option<String>,
    /// `EF_*` name to hex bytes
    #[serde(default)]
    data_groups: BTreeMap<String, String>,
}

/// Percent steps reported for each data group
const PROGRESS_STEPS: [u8; 3] = [0, 50, 100];

pub struct ReplayReader {
    document: PassportDocument,
}

impl ReplayReader {
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let capture: Capture = serde_json::from_str(json)?;

        let mut data_groups = BTreeMap::new();
        for (file, hex_bytes) in &capture.data_groups {
            let Some(id) = DataGroupId::from_file_name(file) else {
                warn!(file = %file, "Skipping unknown file in capture");
                continue;
            };
            let bytes = hex::decode(hex_bytes).map_err(|source| ReplayError::Hex {
                file: file.clone(),
                source,
            })?;
            data_groups.insert(id, bytes);
        }

        let photo = capture.photo.as_deref().map(|b64| STANDARD.decode(b64)).transpose()?;

        Ok(Self {
            document: PassportDocument {
                date_of_birth: capture.date_of_birth,
                document_number: capture.document_number,
                date_of_expiry: capture.date_of_expiry,
                gender: capture.gender,
                personal_number: capture.personal_number,
                nationality: capture.nationality,
                mrz: capture.mrz,
                first_name: capture.first_name,
                last_name: capture.last_name,
                place_of_birth: capture.place_of_birth,
                photo,
                data_groups,
            },
        })
    }

    /// Key the captured document would accept
    fn expected_key(&self) -> Result<AccessKey, ReadError> {
        // The century never reaches the MRZ information, any DateKind works
        let birth = Date6::from_document(&self.document.date_of_birth, DateKind::Expiry, 0)
            .map_err(|e| ReadError::Other(format!("capture birth date: {e}")))?;
        let expiry = Date6::from_document(&self.document.date_of_expiry, DateKind::Expiry, 0)
            .map_err(|e| ReadError::Other(format!("capture expiry date: {e}")))?;
        Ok(AccessKey::derive(&self.document.document_number, birth, expiry))
    }
}

#[async_trait]
impl PassportReader for ReplayReader {
    async fn read_document(
        &self,
        key: &AccessKey,
        request: &DataGroupRequest,
        progress: ProgressSink,
    ) -> Result<PassportDocument, ReadError> {
        progress.emit(ReadProgressEvent::AwaitingDocument);

        if self.expected_key()? != *key {
            progress.emit(ReadProgressEvent::Error(
                "Access control failed. Check the document details.".to_string(),
            ));
            return Err(ReadError::AuthenticationFailed);
        }

        let mut document = self.document.clone();
        document.data_groups.clear();

        for group in request.groups() {
            let Some(bytes) = self.document.data_groups.get(group) else {
                debug!(%group, "Group not present in capture");
                continue;
            };
            for percent in PROGRESS_STEPS {
                progress.emit(ReadProgressEvent::Reading {
                    group: *group,
                    percent,
                });
                tokio::task::yield_now().await;
            }
            document.data_groups.insert(*group, bytes.clone());
        }

        if !request.contains(DataGroupId::Dg2) {
            document.photo = None;
        }

        progress.emit(ReadProgressEvent::Success);
        Ok(document)
    }
}
