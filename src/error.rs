//! Error types for Configuration Manager operations.

use std::path::PathBuf;

/// Errors returned by the client, its settings, the service scaffold and the
/// YAML loader.
#[derive(Debug, thiserror::Error)]
pub enum ConfigManagerError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Configuration Manager answered with a non-200 status.
    #[error("Status Code: {status}, Message: {message}")]
    ProxyError { status: u16, message: String },

    /// The response body did not match the requested shape.
    #[error("failed to deserialize response: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Provider {provider} not supported.")]
    ProviderNotSupported { provider: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid client settings: {0}")]
    InvalidSettings(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("service connector is not connected")]
    NotConnected,

    #[error("configuration file not found: {}", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("failed to validate configuration from {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigManagerError {
    /// HTTP-style status describing the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProxyError { status, .. } => *status,
            Self::ProviderNotSupported { .. } => 503,
            Self::InvalidRequest(_) => 400,
            Self::Transport(_) | Self::Deserialization(_) => 502,
            Self::Cancelled => 499,
            _ => 500,
        }
    }

    /// Returns true when the remote manager was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, ConfigManagerError>;
