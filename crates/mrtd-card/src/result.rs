//! Flattening a read document into the caller-facing result record

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Datelike, Utc};
use image::codecs::jpeg::JpegEncoder;
use mrtd_common::{expand, Date6, DateKind};
use serde::Serialize;
use tracing::{debug, warn};

use crate::protocol::PassportDocument;

/// JPEG quality used when re-encoding the face image
pub const PHOTO_JPEG_QUALITY: u8 = 80;

/// Result of a successful session, serialized as a flat key-value map.
///
/// `identityNo` and `placeOfBirth` are always present (possibly empty);
/// `photo` is omitted entirely when not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// YYYYMMDD
    pub birth_date: String,
    pub document_no: String,
    /// YYYYMMDD
    pub expiry_date: String,
    pub gender: String,
    pub identity_no: String,
    pub nationality: String,
    pub mrz: String,
    pub first_name: String,
    pub last_name: String,
    pub place_of_birth: String,
    /// `EF_*` file name to raw data group bytes
    pub raw_files: BTreeMap<String, Vec<u8>>,
    /// Base64 JPEG
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Builds a [`ResultRecord`] from a decoded document
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    include_images: bool,
    reference_year: i32,
}

impl ResultAssembler {
    pub fn new(include_images: bool) -> Self {
        Self {
            include_images,
            reference_year: Utc::now().year(),
        }
    }

    /// Pin the year used to pick a century for two-digit birth years
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn assemble(&self, document: &PassportDocument) -> ResultRecord {
        let raw_files = document
            .data_groups
            .iter()
            .filter_map(|(id, bytes)| match id.file_name() {
                Some(name) => Some((name.to_string(), bytes.clone())),
                None => {
                    debug!(group = %id, "Dropping data group with no file name");
                    None
                }
            })
            .collect();

        let photo = if self.include_images {
            document.photo.as_deref().and_then(|bytes| match encode_photo(bytes) {
                Ok(encoded) => Some(encoded),
                Err(err) => {
                    warn!(error = %err, "Could not re-encode face image, omitting photo");
                    None
                }
            })
        } else {
            None
        };

        ResultRecord {
            birth_date: self.widen(&document.date_of_birth, DateKind::Birth),
            document_no: document.document_number.clone(),
            expiry_date: self.widen(&document.date_of_expiry, DateKind::Expiry),
            gender: document.gender.clone(),
            identity_no: document.personal_number.clone().unwrap_or_default(),
            nationality: document.nationality.clone(),
            mrz: document.mrz.clone(),
            first_name: document.first_name.clone(),
            last_name: document.last_name.clone(),
            place_of_birth: document.place_of_birth.clone().unwrap_or_default(),
            raw_files,
            photo,
        }
    }

    /// Chip dates that fail to parse are passed through as stored
    fn widen(&self, stored: &str, kind: DateKind) -> String {
        match Date6::from_document(stored, kind, self.reference_year) {
            Ok(date) => expand(date).to_string(),
            Err(err) => {
                warn!(error = %err, ?kind, "Unparseable document date");
                stored.to_string()
            }
        }
    }
}

/// Decode an image and re-encode it as base64 JPEG at [`PHOTO_JPEG_QUALITY`]
pub fn encode_photo(bytes: &[u8]) -> Result<String, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;

    let mut jpeg = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, PHOTO_JPEG_QUALITY);
        encoder.encode_image(&decoded.to_rgb8())?;
    }

    Ok(STANDARD.encode(&jpeg))
}
