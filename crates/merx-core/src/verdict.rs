//! # Validation Verdicts
//!
//! Types for the remote line-item validation round-trip.
//!
//! The validation rules themselves live on the remote service; this module
//! only models its answer and how that answer projects onto ledger lines.
//!
//! ```text
//! Ledger items ──► validation service ──► ValidationReport
//!                                              │
//!                            merge by product_ref (valid-by-omission)
//!                                              ▼
//!                                    per-item ValidationVerdict
//! ```
//!
//! A verdict is only meaningful for the exact item set it was computed
//! against. The instant the ledger's items or target party change, stored
//! verdicts are dropped and the item shows as pending again.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Report Types
// =============================================================================

/// One problem the remote service found with a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemIssue {
    /// Catalog reference of the offending line.
    pub product_ref: String,

    /// Display name echoed back for messages.
    pub product_name: String,

    /// Critical issues block submission unconditionally; non-critical
    /// issues only require an explicit user override.
    pub is_critical: bool,

    /// Human-readable explanation.
    pub message: String,
}

/// The remote service's answer for one validation round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationReport {
    /// True when every submitted item passed.
    pub is_valid: bool,

    /// Per-item problems. Items absent from this list are valid by omission.
    pub invalid_items: Vec<ItemIssue>,
}

impl ValidationReport {
    /// A report that approves everything.
    pub fn all_valid() -> Self {
        ValidationReport {
            is_valid: true,
            invalid_items: Vec::new(),
        }
    }

    /// True when at least one issue is critical.
    pub fn has_critical(&self) -> bool {
        self.invalid_items.iter().any(|i| i.is_critical)
    }

    /// Number of critical issues, for error messages.
    pub fn critical_count(&self) -> usize {
        self.invalid_items.iter().filter(|i| i.is_critical).count()
    }

    /// The verdict this report implies for one product reference.
    ///
    /// Items with no matching issue entry are treated as valid.
    pub fn verdict_for(&self, product_ref: &str) -> ValidationVerdict {
        match self.invalid_items.iter().find(|i| i.product_ref == product_ref) {
            Some(issue) => ValidationVerdict {
                is_valid: false,
                is_critical: issue.is_critical,
                message: issue.message.clone(),
            },
            None => ValidationVerdict::valid(),
        }
    }
}

// =============================================================================
// Per-Item Verdict
// =============================================================================

/// The merged judgment for a single ledger line, keyed by product reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub is_critical: bool,
    pub message: String,
}

impl ValidationVerdict {
    /// Verdict for an item the service had no complaint about.
    pub fn valid() -> Self {
        ValidationVerdict {
            is_valid: true,
            is_critical: false,
            message: String::new(),
        }
    }
}

/// Display projection of a line's validation state.
///
/// `Pending` covers both "never validated" and "verdict went stale".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase", tag = "kind")]
#[ts(export)]
pub enum ItemStatus {
    Pending,
    Valid,
    Invalid { critical: bool, message: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
