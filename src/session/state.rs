//! Session phases and the pure transition function between them.
//!
//! `transition` never performs I/O. Callers apply the returned state and
//! carry out the returned [`Effect`] themselves.

use super::models::DocumentRef;

/// A question that has been sent and not yet answered. `document_id` is
/// captured when the question leaves, so a late answer keeps its binding
/// even if another document became active meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub question: String,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No upload has succeeded since the session started or was reset.
    #[default]
    NoDocument,
    Ready {
        document: DocumentRef,
    },
    /// A question is in flight. `uploading` is set when a replacement
    /// document is being uploaded at the same time.
    AwaitingAnswer {
        document: DocumentRef,
        pending: PendingQuestion,
        uploading: bool,
    },
    UploadInFlight {
        previous: Option<DocumentRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UploadStarted,
    UploadSucceeded(DocumentRef),
    UploadFailed,
    QuestionSent { question: String },
    AnswerSettled,
    Reset,
}

/// Work the caller must start after applying a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Upload,
    Ask(PendingQuestion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no document has been uploaded yet")]
    NoDocument,
    #[error("a question is already awaiting an answer")]
    AnswerPending,
    #[error("an upload is already in flight")]
    UploadInFlight,
    #[error("no matching operation is in flight")]
    NothingInFlight,
}

impl SessionState {
    /// The active document, if any upload has succeeded.
    pub fn document(&self) -> Option<&DocumentRef> {
        match self {
            SessionState::NoDocument => None,
            SessionState::Ready { document } | SessionState::AwaitingAnswer { document, .. } => {
                Some(document)
            }
            SessionState::UploadInFlight { previous } => previous.as_ref(),
        }
    }

    pub fn pending(&self) -> Option<&PendingQuestion> {
        match self {
            SessionState::AwaitingAnswer { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(
            self,
            SessionState::UploadInFlight { .. } | SessionState::AwaitingAnswer { uploading: true, .. }
        )
    }

    pub fn is_awaiting_answer(&self) -> bool {
        matches!(self, SessionState::AwaitingAnswer { .. })
    }

    pub fn can_send(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::NoDocument => "no-document",
            SessionState::Ready { .. } => "ready",
            SessionState::AwaitingAnswer { .. } => "awaiting-answer",
            SessionState::UploadInFlight { .. } => "upload-in-flight",
        }
    }
}

pub fn transition(
    state: &SessionState,
    event: Event,
) -> Result<(SessionState, Effect), Rejection> {
    use SessionState::*;

    let next = match (state, event) {
        (_, Event::Reset) => (NoDocument, Effect::None),

        (NoDocument, Event::UploadStarted) => (UploadInFlight { previous: None }, Effect::Upload),
        (Ready { document }, Event::UploadStarted) => (
            UploadInFlight {
                previous: Some(document.clone()),
            },
            Effect::Upload,
        ),
        (
            AwaitingAnswer {
                document,
                pending,
                uploading: false,
            },
            Event::UploadStarted,
        ) => (
            AwaitingAnswer {
                document: document.clone(),
                pending: pending.clone(),
                uploading: true,
            },
            Effect::Upload,
        ),
        (UploadInFlight { .. } | AwaitingAnswer { .. }, Event::UploadStarted) => {
            return Err(Rejection::UploadInFlight)
        }

        (UploadInFlight { .. }, Event::UploadSucceeded(document)) => {
            (Ready { document }, Effect::None)
        }
        (
            AwaitingAnswer {
                pending,
                uploading: true,
                ..
            },
            Event::UploadSucceeded(document),
        ) => (
            AwaitingAnswer {
                document,
                pending: pending.clone(),
                uploading: false,
            },
            Effect::None,
        ),
        (UploadInFlight { previous }, Event::UploadFailed) => match previous {
            Some(document) => (
                Ready {
                    document: document.clone(),
                },
                Effect::None,
            ),
            None => (NoDocument, Effect::None),
        },
        (
            AwaitingAnswer {
                document,
                pending,
                uploading: true,
            },
            Event::UploadFailed,
        ) => (
            AwaitingAnswer {
                document: document.clone(),
                pending: pending.clone(),
                uploading: false,
            },
            Effect::None,
        ),
        (_, Event::UploadSucceeded(_) | Event::UploadFailed) => {
            return Err(Rejection::NothingInFlight)
        }

        (Ready { document }, Event::QuestionSent { question }) => {
            let pending = PendingQuestion {
                question,
                document_id: document.id.clone(),
            };
            (
                AwaitingAnswer {
                    document: document.clone(),
                    pending: pending.clone(),
                    uploading: false,
                },
                Effect::Ask(pending),
            )
        }
        (NoDocument, Event::QuestionSent { .. }) => return Err(Rejection::NoDocument),
        (AwaitingAnswer { .. }, Event::QuestionSent { .. }) => {
            return Err(Rejection::AnswerPending)
        }
        (UploadInFlight { .. }, Event::QuestionSent { .. }) => {
            return Err(Rejection::UploadInFlight)
        }

        (
            AwaitingAnswer {
                document,
                uploading,
                ..
            },
            Event::AnswerSettled,
        ) => {
            let next = if *uploading {
                UploadInFlight {
                    previous: Some(document.clone()),
                }
            } else {
                Ready {
                    document: document.clone(),
                }
            };
            (next, Effect::None)
        }
        (_, Event::AnswerSettled) => return Err(Rejection::NothingInFlight),
    };

    Ok(next)
}
