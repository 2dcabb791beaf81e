//! # merx-client: HTTP Collaborators
//!
//! Typed reqwest implementations of the collaborator traits from
//! merx-flow, plus the TOML configuration they are built from.
//!
//! ```text
//!   ┌──────────────┐      ┌─────────────┐      ┌───────────────────┐
//!   │ ClientConfig │ ───> │  ApiClient  │ ───> │ storefront backend│
//!   │ (merx.toml)  │      │  (reqwest)  │      │ (JSON over HTTPS) │
//!   └──────────────┘      └─────────────┘      └───────────────────┘
//! ```
//!
//! The flow layer never sees HTTP. It talks to `CatalogService`,
//! `ValidationService` and `RecordStore`; this crate is where those
//! traits meet the network.

pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use client::ApiClient;
pub use config::{ApiCfg, AuthCfg, ClientConfig};
pub use error::ClientError;
