//! The file-center session: which document is active, the question/answer
//! exchange about it, and the transcript both produce.
//!
//! All state sits behind one lock that is never held across an `.await`.
//! Every operation takes the lock to validate and record the start, releases
//! it for the backend call, then takes it again to settle. A session epoch
//! ties each settle to the session it started in, so results arriving after
//! a [`FileCenter::reset`] are dropped.

pub mod chat;
pub mod models;
pub mod state;
pub mod transcript;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

use crate::gateway::{Gateway, GatewayError, DEFAULT_MODEL_TYPE};
use crate::notify::Notifier;
use models::{DocumentKind, DocumentRef, FileHandle, Message};
use state::{Effect, Event, Rejection, SessionState};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use transcript::Transcript;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("nothing to export yet")]
    NothingToExport,
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("request failed: {0}")]
    Transport(#[from] GatewayError),
    #[error("session was reset before the request settled")]
    Discarded,
    #[error("failed to write transcript to {path}: {source}")]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SessionError {
    /// Rejected locally, before any request left.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::NoFileSelected
                | SessionError::EmptyQuestion
                | SessionError::NothingToExport
                | SessionError::Rejected(_)
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Selection {
    pub file: Arc<FileHandle>,
    pub kind: DocumentKind,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub session_id: Uuid,
    pub epoch: u64,
    pub state: SessionState,
    pub transcript: Transcript,
    pub selection: Option<Selection>,
}

impl Inner {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            epoch: 0,
            state: SessionState::NoDocument,
            transcript: Transcript::new(),
            selection: None,
        }
    }

    /// Run the reducer and keep its result.
    pub fn apply(&mut self, event: Event) -> Result<Effect, Rejection> {
        let from = self.state.name();
        let (next, effect) = state::transition(&self.state, event)?;
        tracing::debug!(session = %self.session_id, from, to = next.name(), "session transition");
        self.state = next;
        Ok(effect)
    }
}

pub struct FileCenter<G, N> {
    gateway: G,
    notifier: N,
    model_type: String,
    inner: Mutex<Inner>,
}

impl<G: Gateway, N: Notifier> FileCenter<G, N> {
    pub fn new(gateway: G, notifier: N) -> Self {
        Self {
            gateway,
            notifier,
            model_type: DEFAULT_MODEL_TYPE.to_string(),
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn session_id(&self) -> Uuid {
        self.lock().session_id
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn document(&self) -> Option<DocumentRef> {
        self.lock().state.document().cloned()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.messages().to_vec()
    }

    /// Name of the currently selected file, if any.
    pub fn selected_file(&self) -> Option<String> {
        self.lock().selection.as_ref().map(|s| s.file.name.clone())
    }

    /// True while a question waits for its answer.
    pub fn is_thinking(&self) -> bool {
        self.lock().state.is_awaiting_answer()
    }

    /// Whether the question input should accept a submission.
    pub fn can_send(&self) -> bool {
        self.lock().state.can_send()
    }

    /// Whether the upload control should accept a submission.
    pub fn can_submit(&self) -> bool {
        let inner = self.lock();
        inner.selection.is_some() && !inner.state.is_uploading()
    }

    /// Placeholder text for the question input.
    pub fn input_hint(&self) -> &'static str {
        if self.lock().state.document().is_some() {
            "Ask a question about the document..."
        } else {
            "Upload a document first..."
        }
    }

    /// Plain-text transcript. With only the greeting present nothing is
    /// produced and an informational notification is raised instead.
    pub fn export(&self) -> Option<String> {
        let text = self.lock().transcript.export();
        if text.is_none() {
            self.notifier.info("There is no conversation to export yet.");
        }
        text
    }

    /// Write the transcript into `dir` under a date-stamped name.
    pub async fn save_export(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let text = self.export().ok_or(SessionError::NothingToExport)?;
        let date = chrono::Local::now().date_naive();
        let path = dir.join(export_file_name(date));

        tokio::fs::write(&path, text)
            .await
            .map_err(|source| SessionError::Export {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), "transcript exported");
        self.notifier.success("Chat history saved.");
        Ok(path)
    }

    /// Clear the transcript, forget the document and the selection, and
    /// start a new session. In-flight requests are abandoned.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let _ = inner.apply(Event::Reset);
        inner.transcript.reset();
        inner.selection = None;
        inner.epoch += 1;
        inner.session_id = Uuid::new_v4();
        tracing::info!(session = %inner.session_id, "session reset");
    }
}

pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("chat-history-{}.txt", date.format("%Y-%m-%d"))
}
