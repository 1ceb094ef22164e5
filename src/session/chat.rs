use super::models::{Message, NewMessage};
use super::state::{Effect, Event, Rejection};
use super::{FileCenter, SessionError};
use crate::gateway::{AskRequest, Gateway};
use crate::notify::Notifier;

fn failure(detail: &str) -> String {
    format!("❌ Sorry, I can't answer right now: {}", detail)
}

impl<G: Gateway, N: Notifier> FileCenter<G, N> {
    /// Ask a question about the active document and wait for the answer.
    ///
    /// The question is bound to the document active at send time and the
    /// answer inherits that binding, whatever became active meanwhile.
    /// A failed answer is recorded in the transcript and leaves the
    /// session ready for another attempt.
    pub async fn send(&self, text: &str) -> Result<Message, SessionError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let (pending, epoch, session) = {
            let mut inner = self.lock();
            let effect = inner.apply(Event::QuestionSent {
                question: question.to_string(),
            });
            let pending = match effect {
                Ok(Effect::Ask(pending)) => pending,
                Ok(_) => return Err(Rejection::NothingInFlight.into()),
                Err(Rejection::NoDocument) => {
                    drop(inner);
                    self.notifier.warning("Please upload a document first.");
                    return Err(Rejection::NoDocument.into());
                }
                Err(rejection) => {
                    tracing::warn!(session = %inner.session_id, %rejection, "question rejected");
                    return Err(rejection.into());
                }
            };
            inner
                .transcript
                .append(NewMessage::user(question).bound_to(&pending.document_id));
            (pending, inner.epoch, inner.session_id)
        }; // lock released here

        tracing::info!(%session, document = %pending.document_id, "question sent");
        let request = AskRequest {
            question: pending.question.clone(),
            file_name: pending.document_id.clone(),
            model_type: self.model_type.clone(),
        };
        let result = self.gateway.ask(&request).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(%session, document = %pending.document_id, "answer settled after reset, dropped");
            return Err(SessionError::Discarded);
        }
        inner.apply(Event::AnswerSettled)?;
        let superseded = inner
            .state
            .document()
            .map_or(true, |active| active.id != pending.document_id);

        match result {
            Ok(response) => {
                let message = inner.transcript.append(
                    NewMessage::assistant(response.answer)
                        .bound_to(&pending.document_id)
                        .superseded(superseded),
                );
                tracing::info!(%session, document = %pending.document_id, superseded, "answer received");
                Ok(message)
            }
            Err(err) => {
                let detail = err.detail();
                inner.transcript.append(
                    NewMessage::assistant(failure(&detail))
                        .bound_to(&pending.document_id)
                        .failed()
                        .superseded(superseded),
                );
                drop(inner);

                tracing::warn!(%session, document = %pending.document_id, error = %err, "answer failed");
                self.notifier
                    .error(&format!("Could not get an answer: {}", detail));
                Err(err.into())
            }
        }
    }
}
