//! # Remote Collaborator Contracts
//!
//! Abstract contracts for the external services the flow layer talks to.
//! merx owns no wire protocol; these traits are the whole surface, and
//! merx-client supplies the HTTP implementations.
//!
//! ```text
//! CatalogService    read-only products / suppliers / customers
//! ValidationService POST validate(party, items) -> ValidationReport
//! RecordStore       create / cancel / markPaid / delete / getById / list
//! ```
//!
//! The external payment capture provider has no trait: the frontend's
//! payment button drives it, and the flow only consumes the resulting
//! `PaymentCapture` tuple.

use async_trait::async_trait;
use merx_core::{
    CatalogProduct, LineItem, Party, PaymentCapture, PaymentMethod, RecordKind, RecordStatus,
    Totals, ValidationReport,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Remote Error
// =============================================================================

/// Failure of any remote call, transport or service side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an error status.
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },
}

impl RemoteError {
    /// The message to surface to the caller, remote detail when available.
    pub fn message(&self) -> String {
        match self {
            RemoteError::Transport(msg) => msg.clone(),
            RemoteError::Remote { message, .. } => message.clone(),
        }
    }
}

// =============================================================================
// Contract Types
// =============================================================================

/// Filter for catalog product listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Free-text search over name/sku, when set.
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

/// Everything the store needs to create a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub party: Party,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    /// Chosen settlement method; absent for purchase invoices.
    pub payment_method: Option<PaymentMethod>,
}

/// The store's answer to a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecord {
    pub remote_id: String,
    pub status: RecordStatus,
    /// Totals as the store recorded them, echoed back for display.
    pub totals: Totals,
}

/// One row of a record listing, and the shape of a get-by-id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub remote_id: String,
    pub kind: RecordKind,
    pub status: RecordStatus,
    pub totals: Totals,
}

/// Paging and status filter for record listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    pub page: u32,
    pub limit: u32,
    pub status: Option<RecordStatus>,
}

/// One page of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub records: Vec<RecordSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub total_records: u64,
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Read-only catalog lookups.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter)
        -> Result<Vec<CatalogProduct>, RemoteError>;

    async fn list_active_suppliers(&self) -> Result<Vec<Party>, RemoteError>;

    async fn list_active_customers(&self) -> Result<Vec<Party>, RemoteError>;
}

/// The remote line-item validation service.
///
/// A single round-trip per call; the validation rules live remotely.
#[async_trait]
pub trait ValidationService: Send + Sync {
    async fn validate(
        &self,
        party: &Party,
        items: &[LineItem],
    ) -> Result<ValidationReport, RemoteError>;
}

/// The remote order/invoice store. All persistence is delegated here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, draft: &RecordDraft) -> Result<CreatedRecord, RemoteError>;

    async fn cancel(&self, remote_id: &str) -> Result<RecordStatus, RemoteError>;

    async fn mark_paid(
        &self,
        remote_id: &str,
        capture: &PaymentCapture,
    ) -> Result<RecordStatus, RemoteError>;

    async fn delete(&self, remote_id: &str) -> Result<(), RemoteError>;

    async fn get_by_id(&self, remote_id: &str) -> Result<Option<RecordSummary>, RemoteError>;

    async fn list(&self, filter: &RecordFilter) -> Result<RecordPage, RemoteError>;
}
