pub mod http;

use crate::session::models::FileHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpGateway;

/// Model the backend should answer with unless configured otherwise.
pub const DEFAULT_MODEL_TYPE: &str = "gemini";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub total_chunks: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub file_name: String,
    pub model_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
}

/// The backend operations the session consumes. Implementations attach
/// credentials themselves; callers never see them.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn upload(&self, file: &FileHandle) -> Result<UploadReceipt, GatewayError>;

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {detail}")]
    Api { status: u16, detail: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Short reason suitable for showing to the user. Authentication,
    /// validation and server failures all surface the same way.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Http(err) if err.is_timeout() => "the request timed out".to_string(),
            GatewayError::Http(err) if err.is_connect() => {
                "could not reach the server".to_string()
            }
            GatewayError::Http(err) => err.to_string(),
            GatewayError::Api { detail, .. } => detail.clone(),
            GatewayError::Parse(msg) => format!("unexpected response: {msg}"),
        }
    }
}

/// Supplies the bearer credential for outgoing requests.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        let token = self.0.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// Reads the credential from an environment variable on every request,
/// so a refreshed token is picked up without rebuilding the gateway.
#[derive(Debug, Clone)]
pub struct EnvToken {
    pub var: String,
}

impl CredentialProvider for EnvToken {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_receipt_uses_backend_field_names() {
        let receipt: UploadReceipt =
            serde_json::from_str(r#"{"filename":"report.pdf","type":"pdf","total_chunks":12}"#)
                .unwrap();
        assert_eq!(receipt.filename, "report.pdf");
        assert_eq!(receipt.file_type, "pdf");
        assert_eq!(receipt.total_chunks, 12);
    }

    #[test]
    fn test_api_detail_is_surfaced_verbatim() {
        let err = GatewayError::Api {
            status: 503,
            detail: "model unavailable".into(),
        };
        assert_eq!(err.detail(), "model unavailable");
        assert_eq!(err.to_string(), "API error: 503 - model unavailable");
    }

    #[test]
    fn test_static_token_ignores_blank() {
        assert_eq!(StaticToken("  ".into()).bearer_token(), None);
        assert_eq!(
            StaticToken(" abc ".into()).bearer_token().as_deref(),
            Some("abc")
        );
        assert_eq!(NoCredentials.bearer_token(), None);
    }

    #[test]
    fn test_env_token_reads_variable() {
        let var = "FILE_CENTER_TEST_TOKEN_READS";
        std::env::set_var(var, "t0ken");
        let provider = EnvToken { var: var.into() };
        assert_eq!(provider.bearer_token().as_deref(), Some("t0ken"));
        std::env::remove_var(var);
        assert_eq!(provider.bearer_token(), None);
    }
}
