//! # Wire Envelopes
//!
//! Request/response envelopes the backend wraps around the domain types.
//! Most payloads reuse the camelCase serde shapes from merx-core and
//! merx-flow directly; only the envelopes that exist purely on the wire
//! live here.

use merx_core::{Party, RecordStatus, Totals};
use merx_flow::RecordSummary;
use serde::{Deserialize, Serialize};

/// Error body the backend returns on non-2xx answers.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// Validation request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest<'a, T> {
    pub target_party_ref: &'a str,
    pub items: &'a [T],
}

/// Create response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub id: String,
    pub status: RecordStatus,
    pub totals: Totals,
}

/// Status-only response, for cancel and mark-paid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: RecordStatus,
}

/// Paged listing envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_records: u64,
}

/// Record row as listed by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    pub id: String,
    pub kind: merx_core::RecordKind,
    pub status: RecordStatus,
    pub totals: Totals,
}

impl From<RecordRow> for RecordSummary {
    fn from(row: RecordRow) -> Self {
        RecordSummary {
            remote_id: row.id,
            kind: row.kind,
            status: row.status,
            totals: row.totals,
        }
    }
}

/// Party row listing envelope (`data` only, no paging).
#[derive(Debug, Clone, Deserialize)]
pub struct PartyListResponse {
    pub data: Vec<Party>,
}
