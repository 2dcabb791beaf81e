//! # Client Configuration
//!
//! TOML-backed configuration for the HTTP collaborators.
//!
//! ## Configuration File Format
//! ```toml
//! # merx.toml
//! [api]
//! base_url = "https://shop.example.com/api"
//! timeout_secs = 30
//!
//! [auth]
//! bearer_token = "..."   # optional; admin endpoints require it
//! ```

use std::path::Path;
use std::{fs, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiCfg,
    pub auth: AuthCfg,
}

/// Endpoint and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    /// Base URL of the storefront backend, including the `/api` prefix.
    pub base_url: String,

    /// Caller-level request timeout. Remote-call timeouts live here, not
    /// in the flow layer.
    pub timeout_secs: u64,
}

/// Authentication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthCfg {
    /// Bearer token sent with every request when set.
    pub bearer_token: Option<String>,
}

impl Default for ApiCfg {
    fn default() -> Self {
        ApiCfg {
            base_url: "http://localhost:4000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api: ApiCfg::default(),
            auth: AuthCfg::default(),
        }
    }
}

impl ClientConfig {
    /// Loads from disk, or writes and returns the defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ClientError> {
        if path.exists() {
            let raw = fs::read_to_string(path)?;
            let cfg = toml::from_str(&raw)?;
            debug!(path = %path.display(), "client config loaded");
            Ok(cfg)
        } else {
            let cfg = ClientConfig::default();
            cfg.save(path)?;
            debug!(path = %path.display(), "client config created with defaults");
            Ok(cfg)
        }
    }

    /// Persists the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api.base_url, "http://localhost:4000/api");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.auth.bearer_token.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://shop.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.base_url, "https://shop.example.com/api");
        assert_eq!(cfg.api.timeout_secs, 30);
    }

    #[test]
    fn test_roundtrip() {
        let mut cfg = ClientConfig::default();
        cfg.auth.bearer_token = Some("secret".to_string());

        let raw = toml::to_string_pretty(&cfg).unwrap();
        let back: ClientConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back.auth.bearer_token.as_deref(), Some("secret"));
    }
}
