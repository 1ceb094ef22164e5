//! Scripted backend for session tests.

use super::models::FileHandle;
use super::FileCenter;
use crate::gateway::{AskRequest, AskResponse, Gateway, GatewayError, UploadReceipt};
use crate::notify::RecordingNotifier;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

pub type Center = FileCenter<ScriptedGateway, RecordingNotifier>;

enum Reply<T> {
    Ready(Result<T, GatewayError>),
    Deferred(oneshot::Receiver<Result<T, GatewayError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, GatewayError> {
        match self {
            Reply::Ready(result) => result,
            Reply::Deferred(rx) => rx.await.unwrap_or_else(|_| Err(api_error("reply dropped"))),
        }
    }
}

pub fn api_error(detail: &str) -> GatewayError {
    GatewayError::Api {
        status: 500,
        detail: detail.to_string(),
    }
}

/// Replies are consumed in the order they were scripted. Deferred replies
/// stay pending until the test sends through the returned channel.
#[derive(Default)]
pub struct ScriptedGateway {
    uploads: Mutex<VecDeque<Reply<UploadReceipt>>>,
    asks: Mutex<VecDeque<Reply<AskResponse>>>,
    upload_calls: Mutex<Vec<String>>,
    ask_calls: Mutex<Vec<AskRequest>>,
}

impl ScriptedGateway {
    pub fn upload_ok(&self, filename: &str, file_type: &str, total_chunks: u32) {
        self.uploads.lock().unwrap().push_back(Reply::Ready(Ok(UploadReceipt {
            filename: filename.to_string(),
            file_type: file_type.to_string(),
            total_chunks,
        })));
    }

    pub fn upload_err(&self, detail: &str) {
        self.uploads
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Err(api_error(detail))));
    }

    pub fn defer_upload(&self) -> oneshot::Sender<Result<UploadReceipt, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.uploads.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn ask_ok(&self, answer: &str) {
        self.asks.lock().unwrap().push_back(Reply::Ready(Ok(AskResponse {
            answer: answer.to_string(),
        })));
    }

    pub fn ask_err(&self, detail: &str) {
        self.asks
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Err(api_error(detail))));
    }

    pub fn defer_ask(&self) -> oneshot::Sender<Result<AskResponse, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.asks.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn ask_calls(&self) -> Vec<AskRequest> {
        self.ask_calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.upload_calls.lock().unwrap().len() + self.ask_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn upload(&self, file: &FileHandle) -> Result<UploadReceipt, GatewayError> {
        self.upload_calls.lock().unwrap().push(file.name.clone());
        let reply = self.uploads.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(api_error("unscripted upload")),
        }
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, GatewayError> {
        self.ask_calls.lock().unwrap().push(request.clone());
        let reply = self.asks.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(api_error("unscripted ask")),
        }
    }
}

pub fn center() -> Center {
    FileCenter::new(ScriptedGateway::default(), RecordingNotifier::new())
}

pub fn pdf(name: &str) -> FileHandle {
    FileHandle::new(name, b"%PDF-1.7".to_vec())
}

pub fn receipt(filename: &str, total_chunks: u32) -> UploadReceipt {
    UploadReceipt {
        filename: filename.to_string(),
        file_type: "pdf".to_string(),
        total_chunks,
    }
}

/// Yield until `probe` holds, so interleavings don't depend on poll order.
pub async fn until(center: &Center, probe: impl Fn(&Center) -> bool) {
    while !probe(center) {
        tokio::task::yield_now().await;
    }
}
