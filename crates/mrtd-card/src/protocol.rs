//! Seam to the passport protocol reader
//!
//! The reader owns everything below this layer: BAC/PACE, secure
//! messaging, APDU exchange, file selection and TLV decoding. A session
//! only hands it a key and a data group request and gets back a decoded
//! document, with progress reported through a [`ProgressSink`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use mrtd_common::DataGroupId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::access_key::AccessKey;
use crate::error::ReadError;
use crate::selector::DataGroupRequest;

/// Document as decoded by the reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassportDocument {
    /// YYMMDD as stored in DG1
    pub date_of_birth: String,
    pub document_number: String,
    /// YYMMDD as stored in DG1
    pub date_of_expiry: String,
    pub gender: String,
    pub personal_number: Option<String>,
    pub nationality: String,
    /// Full MRZ text from DG1
    pub mrz: String,
    pub first_name: String,
    pub last_name: String,
    pub place_of_birth: Option<String>,
    /// Encoded face image extracted from DG2, if one was read
    pub photo: Option<Vec<u8>>,
    /// Raw bytes of every data group actually read
    pub data_groups: BTreeMap<DataGroupId, Vec<u8>>,
}

/// Progress reported by a reader while a session runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadProgressEvent {
    /// Waiting for the user to present the document
    AwaitingDocument,
    /// Access control handshake in progress
    Authenticating { percent: u8 },
    /// Reading a data group, 0-100 percent
    Reading { group: DataGroupId, percent: u8 },
    /// Chip authentication / active authentication step
    ActiveAuthentication,
    Success,
    /// Reader-supplied description of a problem. Informational only.
    Error(String),
}

/// Sending half of a session's progress channel.
///
/// Cheap to clone and safe to call from any thread. Events emitted after
/// the session has finished are dropped.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: UnboundedSender<ReadProgressEvent>,
}

impl ProgressSink {
    /// Create a sink together with the receiver that drains it
    pub fn channel() -> (Self, UnboundedReceiver<ReadProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: ReadProgressEvent) {
        if let Err(err) = self.tx.send(event) {
            trace!(event = ?err.0, "Progress event after session end dropped");
        }
    }
}

/// Passport protocol reader.
///
/// Implementations perform the device I/O for one session and may fail
/// for any reason; the session maps every failure to a single caller
/// error.
#[async_trait]
pub trait PassportReader: Send + Sync {
    async fn read_document(
        &self,
        key: &AccessKey,
        request: &DataGroupRequest,
        progress: ProgressSink,
    ) -> Result<PassportDocument, ReadError>;
}
