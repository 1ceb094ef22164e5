use crate::gateway::{
    CredentialProvider, EnvToken, NoCredentials, StaticToken, DEFAULT_MODEL_TYPE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_type")]
    pub model_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Inline bearer credential. Wins over `token_env`.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_type: default_model_type(),
            timeout_secs: default_timeout_secs(),
            token: None,
            token_env: default_token_env(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api/v1".to_string()
}
fn default_model_type() -> String {
    DEFAULT_MODEL_TYPE.to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_token_env() -> Option<String> {
    Some("FILE_CENTER_TOKEN".to_string())
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Builds the credential source: inline token, then the environment
    /// variable, then nothing.
    pub fn credentials(&self) -> Box<dyn CredentialProvider> {
        if let Some(token) = self.api.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Box::new(StaticToken(token.to_string()));
        }
        match &self.api.token_env {
            Some(var) if !var.is_empty() => Box::new(EnvToken { var: var.clone() }),
            _ => Box::new(NoCredentials),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credential rendered for display, e.g. `abcd...wxyz`.
    pub fn masked_token(&self) -> Option<String> {
        let value = self.token.as_deref()?;
        if value.len() > 8 && value.is_ascii() {
            Some(format!("{}...{}", &value[..4], &value[value.len() - 4..]))
        } else {
            Some("****".to_string())
        }
    }
}
