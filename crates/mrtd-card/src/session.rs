//! Read session controller
//!
//! Drives one read against a [`PassportReader`], turns its progress events
//! into short status messages for the user, and produces the terminal
//! outcome. Progress arrives over a channel registered before the read
//! starts; the read itself is awaited as a single future.

use mrtd_common::DataGroupId;
use tracing::{debug, info, warn};

use crate::access_key::AccessKey;
use crate::error::SessionError;
use crate::protocol::{PassportDocument, PassportReader, ProgressSink, ReadProgressEvent};
use crate::selector::DataGroupRequest;

pub const AWAITING_DOCUMENT_MESSAGE: &str =
    "Hold your device near an NFC-enabled ID Card / Passport.";
pub const SUCCESS_MESSAGE: &str = "ID Card / Passport Successfully Read.";

const PROGRESS_BAR_WIDTH: usize = 10;
const BAR_DONE: &str = "\u{1F535}";
const BAR_LEFT: &str = "\u{26AA}\u{FE0F}";

/// Lifecycle of a read session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingDocument,
    Reading(DataGroupId),
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded | SessionState::Failed)
    }
}

/// Render a fixed-width progress bar followed by the percent value
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let done = PROGRESS_BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {}%",
        BAR_DONE.repeat(done),
        BAR_LEFT.repeat(PROGRESS_BAR_WIDTH - done),
        percent
    )
}

/// Project a progress event onto the message shown to the user.
///
/// Events without a message (authentication steps) yield `None`.
pub fn status_message(event: &ReadProgressEvent) -> Option<String> {
    match event {
        ReadProgressEvent::AwaitingDocument => Some(AWAITING_DOCUMENT_MESSAGE.to_string()),
        ReadProgressEvent::Reading { group, percent } => {
            Some(format!("Read Data {} ...\n{}", group, progress_bar(*percent)))
        }
        ReadProgressEvent::Success => Some(SUCCESS_MESSAGE.to_string()),
        ReadProgressEvent::Error(description) => Some(description.clone()),
        ReadProgressEvent::Authenticating { .. } | ReadProgressEvent::ActiveAuthentication => None,
    }
}

/// Runs a single session against a reader
pub struct ReadSessionController<'a, R: PassportReader + ?Sized> {
    reader: &'a R,
    state: SessionState,
}

impl<'a, R: PassportReader + ?Sized> ReadSessionController<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self {
            reader,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read the document, reporting status messages through `on_status`.
    ///
    /// Any reader failure becomes [`SessionError::ReadPassportFailed`]; the
    /// cause is only logged. No retries happen here.
    pub async fn run<F>(
        &mut self,
        key: &AccessKey,
        request: &DataGroupRequest,
        mut on_status: F,
    ) -> Result<PassportDocument, SessionError>
    where
        F: FnMut(String) + Send,
    {
        info!(groups = request.len(), "Starting passport read session");

        let reader = self.reader;
        let (sink, mut events) = ProgressSink::channel();
        let read = reader.read_document(key, request, sink);
        tokio::pin!(read);

        let result = loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => self.observe(&event, request, &mut on_status),
                result = &mut read => break result,
            }
        };

        // Report what was queued before the read completed. Closing first
        // bounds the drain when a reader left a sink clone emitting elsewhere.
        events.close();
        while let Ok(event) = events.try_recv() {
            self.observe(&event, request, &mut on_status);
        }

        match result {
            Ok(document) => {
                self.transition(SessionState::Succeeded);
                info!(groups_read = document.data_groups.len(), "Passport read complete");
                Ok(document)
            }
            Err(err) => {
                self.transition(SessionState::Failed);
                warn!(error = %err, "Passport read failed");
                Err(SessionError::ReadPassportFailed)
            }
        }
    }

    fn observe<F>(&mut self, event: &ReadProgressEvent, request: &DataGroupRequest, on_status: &mut F)
    where
        F: FnMut(String),
    {
        debug!(?event, state = ?self.state, "Progress event");

        match event {
            ReadProgressEvent::AwaitingDocument if self.state == SessionState::Idle => {
                self.transition(SessionState::AwaitingDocument);
            }
            ReadProgressEvent::Reading { group, .. } => self.enter_reading(*group, request),
            _ => {}
        }

        if let Some(message) = status_message(event) {
            on_status(message);
        }
    }

    fn enter_reading(&mut self, group: DataGroupId, request: &DataGroupRequest) {
        match self.state {
            SessionState::Reading(current) if current == group => {}
            SessionState::Reading(current) => {
                let backwards = matches!(
                    (request.position(current), request.position(group)),
                    (Some(from), Some(to)) if to < from
                );
                if backwards {
                    debug!(from = %current, to = %group, "Ignoring out-of-order progress");
                } else {
                    self.transition(SessionState::Reading(group));
                }
            }
            SessionState::Idle | SessionState::AwaitingDocument => {
                self.transition(SessionState::Reading(group));
            }
            SessionState::Succeeded | SessionState::Failed => {}
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use async_trait::async_trait;
    use mrtd_common::normalize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;

    #[test]
    fn test_progress_bar_segments() {
        assert_eq!(progress_bar(0), format!("[{}] 0%", BAR_LEFT.repeat(10)));
        assert_eq!(
            progress_bar(55),
            format!("[{}{}] 55%", BAR_DONE.repeat(5), BAR_LEFT.repeat(5))
        );
        assert_eq!(progress_bar(100), format!("[{}] 100%", BAR_DONE.repeat(10)));
        assert_eq!(progress_bar(9), format!("[{}] 9%", BAR_LEFT.repeat(10)));
    }

    #[test]
    fn test_progress_bar_clamps() {
        assert_eq!(progress_bar(250), progress_bar(100));
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            status_message(&ReadProgressEvent::AwaitingDocument).as_deref(),
            Some(AWAITING_DOCUMENT_MESSAGE)
        );
        assert_eq!(
            status_message(&ReadProgressEvent::Success).as_deref(),
            Some(SUCCESS_MESSAGE)
        );
        assert_eq!(
            status_message(&ReadProgressEvent::Error("Tag connection lost".into())).as_deref(),
            Some("Tag connection lost")
        );
        assert_eq!(status_message(&ReadProgressEvent::Authenticating { percent: 40 }), None);
        assert_eq!(status_message(&ReadProgressEvent::ActiveAuthentication), None);

        let reading = status_message(&ReadProgressEvent::Reading {
            group: DataGroupId::Dg11,
            percent: 30,
        })
        .unwrap();
        assert!(reading.starts_with("Read Data DG11 ...\n["));
        assert!(reading.ends_with("] 30%"));
    }

    /// Replays a fixed script of events, then returns `outcome`
    struct ScriptedReader {
        events: Vec<ReadProgressEvent>,
        outcome: Result<PassportDocument, ReadError>,
    }

    #[async_trait]
    impl PassportReader for ScriptedReader {
        async fn read_document(
            &self,
            _key: &AccessKey,
            _request: &DataGroupRequest,
            progress: ProgressSink,
        ) -> Result<PassportDocument, ReadError> {
            for event in &self.events {
                progress.emit(event.clone());
                tokio::task::yield_now().await;
            }
            self.outcome.clone()
        }
    }

    fn key() -> AccessKey {
        AccessKey::derive(
            "L898902C",
            normalize("1969-08-06").unwrap(),
            normalize("1994-06-23").unwrap(),
        )
    }

    fn reading(group: DataGroupId, percent: u8) -> ReadProgressEvent {
        ReadProgressEvent::Reading { group, percent }
    }

    #[tokio::test]
    async fn test_run_success_reports_every_message() {
        let reader = ScriptedReader {
            events: vec![
                ReadProgressEvent::AwaitingDocument,
                ReadProgressEvent::Authenticating { percent: 50 },
                reading(DataGroupId::Dg1, 0),
                reading(DataGroupId::Dg1, 100),
                ReadProgressEvent::Success,
            ],
            outcome: Ok(PassportDocument::default()),
        };
        let request = DataGroupRequest::select(false, &[] as &[&str]);

        let mut controller = ReadSessionController::new(&reader);
        let mut messages = Vec::new();
        let result = controller
            .run(&key(), &request, |message| messages.push(message))
            .await;

        assert!(result.is_ok());
        assert_eq!(controller.state(), SessionState::Succeeded);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], AWAITING_DOCUMENT_MESSAGE);
        assert_eq!(messages[3], SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_error_event_does_not_end_session() {
        let reader = ScriptedReader {
            events: vec![
                ReadProgressEvent::AwaitingDocument,
                ReadProgressEvent::Error("Retrying".into()),
                reading(DataGroupId::Com, 100),
            ],
            outcome: Ok(PassportDocument::default()),
        };
        let request = DataGroupRequest::select(false, &[] as &[&str]);

        let mut controller = ReadSessionController::new(&reader);
        let mut messages = Vec::new();
        let result = controller
            .run(&key(), &request, |message| messages.push(message))
            .await;

        assert!(result.is_ok());
        assert_eq!(messages[1], "Retrying");
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_maps_to_generic_error() {
        let reader = ScriptedReader {
            events: vec![ReadProgressEvent::AwaitingDocument],
            outcome: Err(ReadError::AuthenticationFailed),
        };
        let request = DataGroupRequest::select(false, &[] as &[&str]);

        let mut controller = ReadSessionController::new(&reader);
        let result = controller.run(&key(), &request, |_| {}).await;

        assert_eq!(result, Err(SessionError::ReadPassportFailed));
        assert_eq!(controller.state(), SessionState::Failed);
        assert!(controller.state().is_terminal());
    }

    #[test]
    fn test_reading_state_is_monotonic() {
        let reader = ScriptedReader {
            events: Vec::new(),
            outcome: Ok(PassportDocument::default()),
        };
        let request = DataGroupRequest::select(false, &[] as &[&str]);
        let mut controller = ReadSessionController::new(&reader);
        let mut sink = |_: String| {};

        controller.observe(&ReadProgressEvent::AwaitingDocument, &request, &mut sink);
        assert_eq!(controller.state(), SessionState::AwaitingDocument);

        controller.observe(&reading(DataGroupId::Dg11, 10), &request, &mut sink);
        assert_eq!(controller.state(), SessionState::Reading(DataGroupId::Dg11));

        // DG1 comes before DG11 in the request
        controller.observe(&reading(DataGroupId::Dg1, 10), &request, &mut sink);
        assert_eq!(controller.state(), SessionState::Reading(DataGroupId::Dg11));

        controller.observe(&reading(DataGroupId::Sod, 0), &request, &mut sink);
        assert_eq!(controller.state(), SessionState::Reading(DataGroupId::Sod));

        // A late prompt does not rewind the session
        controller.observe(&ReadProgressEvent::AwaitingDocument, &request, &mut sink);
        assert_eq!(controller.state(), SessionState::Reading(DataGroupId::Sod));
    }

    /// Emits from a plain OS thread, the way blocking PC/SC readers do
    struct ThreadedReader;

    #[async_trait]
    impl PassportReader for ThreadedReader {
        async fn read_document(
            &self,
            _key: &AccessKey,
            _request: &DataGroupRequest,
            progress: ProgressSink,
        ) -> Result<PassportDocument, ReadError> {
            let worker = thread::spawn(move || {
                progress.emit(ReadProgressEvent::AwaitingDocument);
                progress.emit(reading(DataGroupId::Dg1, 100));
            });
            worker
                .join()
                .map_err(|_| ReadError::Other("worker panicked".into()))?;
            Ok(PassportDocument::default())
        }
    }

    #[tokio::test]
    async fn test_progress_from_reader_thread() {
        let reader = ThreadedReader;
        let request = DataGroupRequest::select(false, &[] as &[&str]);

        let mut controller = ReadSessionController::new(&reader);
        let mut messages = Vec::new();
        let result = controller
            .run(&key(), &request, |message| messages.push(message))
            .await;

        assert!(result.is_ok());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], AWAITING_DOCUMENT_MESSAGE);
        assert!(messages[1].starts_with("Read Data DG1 ...\n"));
        assert_eq!(controller.state(), SessionState::Succeeded);
    }

    /// Leaves a sink clone on a thread that keeps emitting after the read returns
    struct LeakyReader {
        stop: Arc<AtomicBool>,
        worker: Mutex<Option<thread::JoinHandle<()>>>,
    }

    #[async_trait]
    impl PassportReader for LeakyReader {
        async fn read_document(
            &self,
            _key: &AccessKey,
            _request: &DataGroupRequest,
            progress: ProgressSink,
        ) -> Result<PassportDocument, ReadError> {
            let stop = Arc::clone(&self.stop);
            let (started_tx, started_rx) = mpsc::channel();
            let worker = thread::spawn(move || {
                progress.emit(reading(DataGroupId::Com, 0));
                let _ = started_tx.send(());
                while !stop.load(Ordering::Relaxed) {
                    progress.emit(reading(DataGroupId::Com, 50));
                }
            });
            let _ = started_rx.recv();
            *self.worker.lock().unwrap() = Some(worker);
            Ok(PassportDocument::default())
        }
    }

    #[tokio::test]
    async fn test_run_finishes_while_sink_still_emitting() {
        let reader = LeakyReader {
            stop: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        };
        let request = DataGroupRequest::select(false, &[] as &[&str]);

        let mut controller = ReadSessionController::new(&reader);
        let mut messages = 0usize;
        let result = controller.run(&key(), &request, |_| messages += 1).await;

        reader.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = reader.worker.lock().unwrap().take() {
            worker.join().unwrap();
        }

        assert!(result.is_ok());
        assert!(messages >= 1);
        assert_eq!(controller.state(), SessionState::Succeeded);
    }
}
