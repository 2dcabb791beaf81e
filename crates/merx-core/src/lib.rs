//! # merx-core: Pure Business Logic for merx
//!
//! The heart of the merx storefront client: all draft/checkout business
//! logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! Frontend screens (cart, checkout, admin invoices)
//!         │
//! merx-flow: sessions, validation orchestration, submission state machine
//!         │
//! merx-core (THIS CRATE): money, ledger, pricing, verdicts
//!         │
//! merx-client: HTTP collaborators (catalog, validation, record store)
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (catalog rows, statuses, payment)
//! - [`ledger`] - The line-item ledger for one draft
//! - [`pricing`] - Subtotal/surcharge/total computation
//! - [`verdict`] - Remote validation report and per-item verdicts
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: network, cache and clock-driven logic live upstairs
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **Explicit Errors**: typed enums, never strings or panics

pub mod error;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod types;
pub mod verdict;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{Fingerprint, Ledger, LineItem, Surcharges};
pub use money::Money;
pub use pricing::Totals;
pub use types::*;
pub use verdict::{ItemIssue, ItemStatus, ValidationReport, ValidationVerdict};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Catches fat-finger input (1000 instead of 10) before it ever reaches the
/// remote validation service. Lines whose product tracks stock are capped by
/// the lower of this and the stock ceiling.
pub const MAX_LINE_QUANTITY: i64 = 999;
