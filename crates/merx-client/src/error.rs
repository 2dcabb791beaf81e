//! Client construction and configuration errors.
//!
//! Request-time failures are not here: those surface as
//! `merx_flow::RemoteError` through the collaborator traits.

use thiserror::Error;

/// Errors while building the client or handling its config file.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("http client build failed: {0}")]
    Build(#[from] reqwest::Error),

    #[error("config read/write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("config encode failed: {0}")]
    EncodeConfig(#[from] toml::ser::Error),
}
