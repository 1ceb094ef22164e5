use super::{AskRequest, AskResponse, CredentialProvider, Gateway, GatewayError, UploadReceipt};
use crate::session::models::FileHandle;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Talks to the dashboard backend over HTTP.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    credentials: Box<dyn CredentialProvider>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Box<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => req.header("Authorization", format!("Bearer {}", token)),
            None => req,
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn upload(&self, file: &FileHandle) -> Result<UploadReceipt, GatewayError> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let req = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form);

        tracing::debug!(file = %file.name, bytes = file.bytes.len(), "POST /upload");
        let resp = self.authorize(req).send().await?;
        read_json(resp).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, GatewayError> {
        let req = self
            .client
            .post(format!("{}/ask", self.base_url))
            .header("Content-Type", "application/json")
            .json(request);

        tracing::debug!(file = %request.file_name, model = %request.model_type, "POST /ask");
        let resp = self.authorize(req).send().await?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            detail: error_detail(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
        });
    }

    resp.json()
        .await
        .map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Pull the reason out of an error body. The backend reports
/// `{"detail": "..."}`, validation failures carry a structured `detail`.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}
