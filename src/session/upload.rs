use super::models::{DocumentKind, DocumentRef, FileHandle, NewMessage};
use super::state::Event;
use super::{FileCenter, Selection, SessionError};
use crate::gateway::{Gateway, UploadReceipt};
use crate::notify::Notifier;
use std::sync::Arc;

fn acknowledgement(document: &DocumentRef) -> String {
    format!(
        "✅ \"{}\" was analyzed successfully ({} chunks). You can ask your questions now.",
        document.id, document.chunk_count
    )
}

fn failure(detail: &str) -> String {
    format!("❌ The file could not be uploaded: {}", detail)
}

fn into_document(receipt: UploadReceipt, selected: DocumentKind) -> DocumentRef {
    let kind = DocumentKind::from_label(&receipt.file_type)
        .or_else(|| DocumentKind::from_file_name(&receipt.filename))
        .unwrap_or(selected);
    DocumentRef {
        id: receipt.filename,
        kind,
        chunk_count: receipt.total_chunks,
    }
}

impl<G: Gateway, N: Notifier> FileCenter<G, N> {
    /// Pick the file the next [`submit`](Self::submit) uploads. Missing
    /// handles and unsupported extensions are ignored without a trace in
    /// the transcript. Returns whether the file was accepted.
    pub fn select(&self, file: Option<FileHandle>) -> bool {
        let Some(file) = file else {
            return false;
        };
        let Some(kind) = file.kind() else {
            tracing::debug!(file = %file.name, "unsupported file type ignored");
            return false;
        };

        let mut inner = self.lock();
        tracing::debug!(session = %inner.session_id, file = %file.name, %kind, "file selected");
        inner.selection = Some(Selection {
            file: Arc::new(file),
            kind,
        });
        true
    }

    /// Upload the selected file and make it the active document.
    ///
    /// At most one upload runs at a time. An upload may start while a
    /// question is pending; that question keeps the document it was asked
    /// about.
    pub async fn submit(&self) -> Result<DocumentRef, SessionError> {
        let (selection, epoch, session) = {
            let mut inner = self.lock();
            let Some(selection) = inner.selection.clone() else {
                return Err(SessionError::NoFileSelected);
            };
            if let Err(rejection) = inner.apply(Event::UploadStarted) {
                tracing::warn!(session = %inner.session_id, %rejection, "upload rejected");
                return Err(rejection.into());
            }
            (selection, inner.epoch, inner.session_id)
        }; // lock released here

        tracing::info!(%session, file = %selection.file.name, "uploading document");
        let result = self.gateway.upload(&selection.file).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(%session, file = %selection.file.name, "upload settled after reset, dropped");
            return Err(SessionError::Discarded);
        }

        match result {
            Ok(receipt) => {
                let document = into_document(receipt, selection.kind);
                inner.apply(Event::UploadSucceeded(document.clone()))?;
                let relabeled = inner.transcript.mark_superseded(&document.id);
                inner
                    .transcript
                    .append(NewMessage::assistant(acknowledgement(&document)).bound_to(&document.id));
                drop(inner);

                tracing::info!(
                    %session,
                    document = %document.id,
                    chunks = document.chunk_count,
                    relabeled,
                    "document active"
                );
                self.notifier
                    .success(&format!("\"{}\" uploaded.", document.id));
                Ok(document)
            }
            Err(err) => {
                inner.apply(Event::UploadFailed)?;
                let detail = err.detail();
                inner
                    .transcript
                    .append(NewMessage::assistant(failure(&detail)).failed());
                drop(inner);

                tracing::warn!(%session, file = %selection.file.name, error = %err, "upload failed");
                self.notifier
                    .error(&format!("Upload failed: {}", detail));
                Err(err.into())
            }
        }
    }
}
