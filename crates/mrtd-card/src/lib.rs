//! MRTD Card - Read session orchestration for electronic passports
//!
//! This crate runs a single eMRTD read session: it validates the caller's
//! BAC key fields, derives the access key, picks the data groups to read,
//! drives an asynchronous [`PassportReader`] while projecting its progress
//! into status messages, and flattens the decoded document into a
//! [`ResultRecord`].
//!
//! The protocol work itself (BAC handshake, secure messaging, APDUs, TLV
//! decoding, SOD verification) lives behind the [`PassportReader`] trait.

pub mod access_key;
pub mod error;
pub mod options;
pub mod protocol;
pub mod reader;
pub mod result;
pub mod selector;
pub mod session;

pub use access_key::{AccessKey, AccessKeyInputs};
pub use error::{ReadError, SessionError};
pub use options::{BacKeyOptions, ReadOptions};
pub use protocol::{PassportDocument, PassportReader, ProgressSink, ReadProgressEvent};
pub use reader::is_supported;
pub use result::{ResultAssembler, ResultRecord};
pub use selector::DataGroupRequest;
pub use session::{ReadSessionController, SessionState};

/// Re-export commonly used types
pub use mrtd_common::{DataGroupId, Date6, Date8};

/// Terminal outcome of a session, produced exactly once
pub type SessionOutcome = Result<ResultRecord, SessionError>;

/// Run a complete read session.
///
/// Input validation happens before the reader is touched, so a missing
/// or malformed BAC key fails without any device interaction. Status
/// messages are delivered to `on_status` as the reader reports progress.
pub async fn start_reading<R, F>(reader: &R, options: &ReadOptions, on_status: F) -> SessionOutcome
where
    R: PassportReader + ?Sized,
    F: FnMut(String) + Send,
{
    let inputs = AccessKeyInputs::from_options(options.bac_key.as_ref())?;
    let key = inputs.derive_key();
    let request = DataGroupRequest::select(options.include_images(), options.extra_files());

    let mut controller = ReadSessionController::new(reader);
    let document = controller.run(&key, &request, on_status).await?;

    Ok(ResultAssembler::new(options.include_images()).assemble(&document))
}
