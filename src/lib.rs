pub mod commands;
pub mod config;
pub mod gateway;
pub mod notify;
pub mod session;

pub use config::Config;
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use notify::{Notifier, Severity};
pub use session::models::{DocumentKind, DocumentRef, FileHandle, Message, Role};
pub use session::state::SessionState;
pub use session::{FileCenter, SessionError};

/// Build a session against the HTTP backend described by `config`.
pub fn connect<N: Notifier>(
    config: &Config,
    notifier: N,
) -> Result<FileCenter<HttpGateway, N>, GatewayError> {
    let gateway = HttpGateway::new(
        config.api.base_url.clone(),
        config.credentials(),
        config.api.timeout(),
    )?;
    Ok(FileCenter::new(gateway, notifier).with_model_type(config.api.model_type.clone()))
}
