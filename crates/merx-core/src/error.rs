//! # Error Types
//!
//! Domain errors for merx-core.
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in the message (requested quantity, ceiling, price)
//! 3. Errors are enum variants, never String
//!
//! Local input errors are recovered at the point of the attempted mutation:
//! the ledger is left untouched and the caller is told synchronously. Remote
//! and flow-level failures live in `merx-flow`.

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Input validation failures raised by ledger mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Quantity is below 1 or above the allowed maximum for the line.
    ///
    /// The maximum is the line's stock ceiling when the catalog tracks stock
    /// for the product, otherwise the global per-line cap.
    #[error("invalid quantity {requested}: must be between 1 and {max}")]
    InvalidQuantity { requested: i64, max: i64 },

    /// Unit price is negative. Zero is allowed (free items).
    #[error("invalid unit price {cents}: cannot be negative")]
    InvalidPrice { cents: i64 },

    /// No product reference was supplied for the add.
    #[error("no product selected")]
    NoProductSelected,
}

/// Convenience alias for ledger mutation results.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
