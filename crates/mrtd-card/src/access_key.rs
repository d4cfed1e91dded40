//! BAC access key derivation (ICAO 9303-11, section 9.7)
//!
//! The key is derived from three printed MRZ fields: document number,
//! date of birth and date of expiry. Each field is followed by its check
//! digit, concatenated into the "MRZ information" string and hashed.

use std::fmt;

use mrtd_common::{normalize, Date6};
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::SessionError;
use crate::options::BacKeyOptions;

/// Minimum width of the document number field in the MRZ
const DOCUMENT_NUMBER_WIDTH: usize = 9;

/// Validated inputs for key derivation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyInputs {
    document_number: String,
    date_of_birth: Date6,
    date_of_expiry: Date6,
}

impl AccessKeyInputs {
    pub fn new(document_number: impl Into<String>, date_of_birth: Date6, date_of_expiry: Date6) -> Self {
        Self {
            document_number: document_number.into(),
            date_of_birth,
            date_of_expiry,
        }
    }

    /// Validate raw caller fields.
    ///
    /// Checks run in a fixed order because callers see distinct codes:
    /// all fields present, then birth date, then expiry date. The document
    /// number itself is left to the reader to reject.
    pub fn from_options(bac_key: Option<&BacKeyOptions>) -> Result<Self, SessionError> {
        let (document_no, birth_date, expiry_date) = match bac_key {
            Some(BacKeyOptions {
                document_no: Some(document_no),
                expiry_date: Some(expiry_date),
                birth_date: Some(birth_date),
            }) => (document_no, birth_date, expiry_date),
            _ => return Err(SessionError::MissingBacKey),
        };

        let date_of_birth = normalize(birth_date).map_err(|e| {
            debug!(error = %e, "Rejecting birth date");
            SessionError::InvalidBirthDate
        })?;
        let date_of_expiry = normalize(expiry_date).map_err(|e| {
            debug!(error = %e, "Rejecting expiry date");
            SessionError::InvalidExpiryDate
        })?;

        debug!(document_number_len = document_no.len(), "BAC key fields validated");
        Ok(Self::new(document_no.as_str(), date_of_birth, date_of_expiry))
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn date_of_birth(&self) -> Date6 {
        self.date_of_birth
    }

    pub fn date_of_expiry(&self) -> Date6 {
        self.date_of_expiry
    }

    /// Derive the access key for these inputs
    pub fn derive_key(&self) -> AccessKey {
        AccessKey::derive(&self.document_number, self.date_of_birth, self.date_of_expiry)
    }
}

/// Derived BAC key material handed to the reader
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    mrz_information: String,
}

/// 3DES session keys derived from the key seed
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub k_enc: [u8; 16],
    pub k_mac: [u8; 16],
}

impl AccessKey {
    /// Build the key from normalized fields. Deterministic.
    pub fn derive(document_number: &str, date_of_birth: Date6, date_of_expiry: Date6) -> Self {
        let mut document_number = document_number.trim().to_ascii_uppercase();
        while document_number.len() < DOCUMENT_NUMBER_WIDTH {
            document_number.push('<');
        }

        let birth = date_of_birth.to_string();
        let expiry = date_of_expiry.to_string();

        let mrz_information = format!(
            "{}{}{}{}{}{}",
            document_number,
            check_digit(&document_number),
            birth,
            check_digit(&birth),
            expiry,
            check_digit(&expiry),
        );

        Self { mrz_information }
    }

    /// The MRZ information string the key is hashed from
    pub fn mrz_information(&self) -> &str {
        &self.mrz_information
    }

    /// K_seed: the first 16 bytes of SHA-1 over the MRZ information
    pub fn seed(&self) -> [u8; 16] {
        let digest = Sha1::digest(self.mrz_information.as_bytes());
        let mut seed = [0u8; 16];
        seed.copy_from_slice(&digest[..16]);
        seed
    }

    /// Derive K_enc (counter 1) and K_mac (counter 2) from the seed
    pub fn session_keys(&self) -> SessionKeys {
        let seed = self.seed();
        SessionKeys {
            k_enc: derive_des_key(&seed, 1),
            k_mac: derive_des_key(&seed, 2),
        }
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("mrz_information", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// ICAO 9303 check digit: weights 7-3-1, digits as-is, A-Z as 10-35, filler as 0
pub fn check_digit(field: &str) -> u8 {
    const WEIGHTS: [u32; 3] = [7, 3, 1];

    let sum: u32 = field
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let value = match b {
                b'0'..=b'9' => (b - b'0') as u32,
                b'A'..=b'Z' => (b - b'A') as u32 + 10,
                b'a'..=b'z' => (b - b'a') as u32 + 10,
                _ => 0,
            };
            value * WEIGHTS[i % 3]
        })
        .sum();

    (sum % 10) as u8
}

fn derive_des_key(seed: &[u8; 16], counter: u32) -> [u8; 16] {
    let mut hasher = Sha1::new();
    hasher.update(seed);
    hasher.update(counter.to_be_bytes());
    let digest = hasher.finalize();

    let mut key = [0u8; 16];
    for (out, byte) in key.iter_mut().zip(digest.iter()) {
        *out = with_odd_parity(*byte);
    }
    key
}

/// Set the low bit so the byte has odd parity (DES key convention)
fn with_odd_parity(byte: u8) -> u8 {
    let high = byte & 0xFE;
    if high.count_ones() % 2 == 0 {
        high | 0x01
    } else {
        high
    }
}
