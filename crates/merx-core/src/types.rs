//! # Domain Types
//!
//! Core domain types shared by the ledger, the flow layer and the wire layer.
//!
//! ```text
//! CatalogProduct ──add──► LineItem (ledger.rs)
//! Party          ──set──► Ledger.party
//! RecordStatus   ◄──────  remote order/invoice store
//! PaymentCapture ◄──────  external payment provider
//! ```
//!
//! Catalog rows are read-only facts from the catalog collaborator. The ledger
//! snapshots what it needs from them at add-time (price, name, stock) and
//! never re-syncs; that snapshot semantic is intentional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bps = 0.01%).
///
/// 1000 bps = 10.00%, the standard storefront rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Catalog Rows
// =============================================================================

/// A product row as returned by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogProduct {
    /// Opaque catalog identifier (UUID on the backend).
    pub id: String,

    /// Display name, denormalized into line items at add-time.
    pub name: String,

    /// Current catalog price in cents.
    pub price_cents: i64,

    /// Known stock level, when the catalog tracks it.
    pub stock_quantity: Option<i64>,
}

impl CatalogProduct {
    /// Returns the catalog price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A supplier or customer row from the catalog service.
///
/// A purchase invoice draft targets a supplier; an order draft targets a
/// customer. The ledger only cares that some party was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Party {
    /// Opaque party identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Organization, when the party is a company.
    pub organization: Option<String>,
}

// =============================================================================
// Record Kind & Status
// =============================================================================

/// The kind of record a draft session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RecordKind {
    /// Admin-side purchase invoice (supplier, manual surcharges).
    PurchaseInvoice,
    /// Customer order (standard surcharges: flat shipping, 10% tax).
    Order,
}

/// Status of a submitted record as reported by the remote store.
///
/// Invoices use `Pending`/`Validated`/`Cancelled`; orders use
/// `Pending`/`Processing`/`Shipped`/`Delivered`/`Cancelled`. One enum covers
/// both sets so the cancel guard has a single home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RecordStatus {
    Pending,
    Validated,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl RecordStatus {
    /// Whether an explicit cancel may still be offered for this status.
    ///
    /// Terminal fulfillment states cannot be cancelled. This predicate must
    /// be evaluated against the freshest known remote status before the
    /// cancel action is offered at all.
    pub const fn is_cancellable(&self) -> bool {
        !matches!(
            self,
            RecordStatus::Shipped | RecordStatus::Delivered | RecordStatus::Cancelled
        )
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Validated => "validated",
            RecordStatus::Processing => "processing",
            RecordStatus::Shipped => "shipped",
            RecordStatus::Delivered => "delivered",
            RecordStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a submitted order is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Settled on delivery; the flow terminates at Created.
    CashOnDelivery,
    /// Deferred external capture; the flow continues to AwaitingPayment.
    #[serde(rename = "paypal")]
    PayPal,
}

impl PaymentMethod {
    /// Whether payment is captured by an external provider after creation.
    pub const fn is_deferred(&self) -> bool {
        matches!(self, PaymentMethod::PayPal)
    }
}

/// The result tuple consumed from the external payment capture provider.
///
/// merx never talks to the provider itself; the frontend's payment button
/// hands this over on success and the flow forwards it to the store's
/// mark-paid call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentCapture {
    /// Provider-side transaction identifier.
    pub transaction_id: String,

    /// Provider-side status string (e.g. "COMPLETED").
    pub status: String,

    /// When the capture settled.
    #[ts(as = "String")]
    pub pay_time: DateTime<Utc>,

    /// Payer email reported by the provider.
    pub payer_email: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
