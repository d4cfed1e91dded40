//! Error taxonomy for read sessions

use thiserror::Error;

/// Caller-visible session failure.
///
/// Every variant is terminal: no partial result accompanies it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// `bacKey` or one of its three fields was not supplied
    #[error("Invalid bac key")]
    MissingBacKey,

    #[error("Invalid birth date")]
    InvalidBirthDate,

    #[error("Invalid expiry date")]
    InvalidExpiryDate,

    /// The reader failed; the underlying cause is logged, not carried
    #[error("Error reading passport")]
    ReadPassportFailed,
}

impl SessionError {
    /// Stable code handed across the host bridge
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::MissingBacKey => "ERROR_INVALID_BACK_KEY",
            SessionError::InvalidBirthDate => "ERROR_INVALID_BIRTH_DATE",
            SessionError::InvalidExpiryDate => "ERROR_INVALID_EXPIRY_DATE",
            SessionError::ReadPassportFailed => "ERROR_READ_PASSPORT",
        }
    }
}

/// Failure reported by a `PassportReader` implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("tag connection lost")]
    TagLost,

    #[error("timed out waiting for the document")]
    Timeout,

    #[error("access control authentication failed")]
    AuthenticationFailed,

    #[error("session cancelled by user")]
    UserCancelled,

    #[error("reader connection lost: {0}")]
    ConnectionLost(String),

    #[error("{0}")]
    Other(String),
}
