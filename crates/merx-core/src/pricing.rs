//! # Pricing Calculator
//!
//! Pure total computation from a line-item sequence and surcharge inputs.
//!
//! ```text
//! items ──► subtotal = Σ quantity × unit_price
//! surcharges ──► shipping, tax (pass-through or standard policy)
//! total = subtotal + shipping + tax
//! ```
//!
//! All arithmetic is integer cents; no rounding happens here beyond the
//! half-up rounding inside the percentage tax. Callable any number of
//! times, no side effects.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ledger::{LineItem, Surcharges};
use crate::money::Money;
use crate::types::TaxRate;

/// Fixed tax rate applied by the order checkout flow: 10%.
pub const STANDARD_TAX_RATE: TaxRate = TaxRate::from_bps(1000);

/// Flat shipping charged by the order checkout flow: 10.00.
pub const FLAT_SHIPPING: Money = Money::from_cents(1000);

// =============================================================================
// Totals
// =============================================================================

/// Computed totals for a draft, and the shape frozen into a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes totals for the given items and surcharges.
///
/// The subtotal is order-independent; shipping and tax are taken as given.
pub fn totals(items: &[LineItem], surcharges: Surcharges) -> Totals {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    Totals {
        subtotal,
        shipping: surcharges.shipping,
        tax: surcharges.tax,
        total: subtotal + surcharges.shipping + surcharges.tax,
    }
}

/// Surcharges for the order checkout flow: flat shipping plus 10% tax on
/// the subtotal. The invoice flow never calls this; its surcharges are
/// operator input.
pub fn standard_surcharges(subtotal: Money) -> Surcharges {
    Surcharges::new(FLAT_SHIPPING, subtotal.calculate_tax(STANDARD_TAX_RATE))
}

// =============================================================================
// Unit Tests
// =============================================================================
