//! PC/SC reader discovery

use pcsc::{Context, Scope};
use tracing::debug;

/// Wrapper around a PC/SC context used to find contactless readers
pub struct ReaderContext {
    context: Context,
}

impl ReaderContext {
    /// Establish a PC/SC context
    pub fn new() -> Result<Self, pcsc::Error> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// List all attached readers
    pub fn list_readers(&self) -> Result<Vec<String>, pcsc::Error> {
        let mut readers_buf = [0; 2048];
        let readers = self.context.list_readers(&mut readers_buf)?;

        Ok(readers
            .map(|r| r.to_str().unwrap_or("Unknown").to_string())
            .collect())
    }
}

/// Whether this host can run a read session at all.
///
/// True when a PC/SC context can be established and at least one reader
/// is attached. Never fails; every error reads as "unsupported".
pub fn is_supported() -> bool {
    let context = match ReaderContext::new() {
        Ok(context) => context,
        Err(err) => {
            debug!(error = %err, "PC/SC unavailable");
            return false;
        }
    };

    match context.list_readers() {
        Ok(readers) => {
            debug!(count = readers.len(), "PC/SC readers found");
            !readers.is_empty()
        }
        Err(err) => {
            debug!(error = %err, "Could not list PC/SC readers");
            false
        }
    }
}
