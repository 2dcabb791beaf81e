//! # Line-Item Ledger
//!
//! The in-memory collection of line items for one in-progress invoice or
//! order draft.
//!
//! ## Operations Flow
//! ```text
//! Frontend Action          Ledger Mutation          Verdict Effect
//! ───────────────          ───────────────          ──────────────
//! Pick product ──────────► add_item()               all verdicts dropped
//! Change quantity ───────► update_quantity()        that verdict dropped
//! Remove line ───────────► remove_item()            that verdict dropped
//! Pick supplier/customer ► set_party()              all verdicts dropped
//! Reset / submitted ─────► clear()                  everything reset
//! ```
//!
//! ## Staleness Fingerprint
//! Every mutation that changes the item set or the target party bumps a
//! monotonic revision counter. The revision doubles as the fingerprint the
//! validation orchestrator snapshots at request time and compares at
//! response time; a mismatch means the response describes a ledger that no
//! longer exists and must be discarded.
//!
//! ## Invariants
//! - `quantity >= 1`, `unit_price >= 0` for every stored line
//! - rejected mutations leave the ledger byte-for-byte unchanged
//! - adding the same product twice appends a second line (observed upstream
//!   behavior, kept as-is; see the duplicate-add note in DESIGN.md)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::pricing::{self, Totals};
use crate::types::{CatalogProduct, Party};
use crate::verdict::{ItemStatus, ValidationReport, ValidationVerdict};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Fingerprint
// =============================================================================

/// Snapshot of the ledger's revision counter, used to detect stale async
/// validation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

// =============================================================================
// Line Item
// =============================================================================

/// One line of a draft, frozen at add-time.
///
/// Price, name and stock ceiling are snapshots of the catalog row at the
/// moment the line was added; later catalog changes do not flow back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Catalog reference of the product.
    pub product_ref: String,

    /// Display name at add-time (frozen).
    pub product_name: String,

    /// Unit price in cents at add-time (frozen).
    pub unit_price_cents: i64,

    /// Quantity, always >= 1.
    pub quantity: i64,

    /// Stock level known at add-time; `None` when the catalog does not
    /// track stock for this product. Quantity updates are capped by it.
    pub stock_ceiling: Option<i64>,

    /// When the line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Derived line total. Never stored, always recomputed.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// The largest quantity this line accepts.
    fn quantity_ceiling(&self) -> i64 {
        match self.stock_ceiling {
            Some(stock) => stock.min(MAX_LINE_QUANTITY),
            None => MAX_LINE_QUANTITY,
        }
    }
}

// =============================================================================
// Surcharges
// =============================================================================

/// Shipping and tax amounts applied on top of the item subtotal.
///
/// The invoice flow takes these as operator input; the order flow derives
/// them with [`pricing::standard_surcharges`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Surcharges {
    pub shipping: Money,
    pub tax: Money,
}

impl Surcharges {
    /// No surcharges at all.
    pub const fn zero() -> Self {
        Surcharges {
            shipping: Money::zero(),
            tax: Money::zero(),
        }
    }

    pub const fn new(shipping: Money, tax: Money) -> Self {
        Surcharges { shipping, tax }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The draft ledger: ordered line items, the target party, surcharges, and
/// the current per-item verdicts.
///
/// Insertion order is significant for display and is preserved. One ledger
/// belongs to exactly one draft session; nothing is shared across sessions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    items: Vec<LineItem>,

    /// Supplier (invoice flow) or customer (order flow). Required before
    /// validation and submission.
    party: Option<Party>,

    surcharges: Surcharges,

    /// Verdicts keyed by product reference. An absent key displays as
    /// pending. Cleared whenever it could describe a stale item set.
    verdicts: HashMap<String, ValidationVerdict>,

    /// Monotonic revision; see the module docs on fingerprints.
    revision: u64,
}

impl Ledger {
    /// Creates an empty ledger for a new draft session.
    pub fn new() -> Self {
        Ledger::default()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Appends a line for `product` with the given quantity.
    ///
    /// Fails with `NoProductSelected` for an empty product reference,
    /// `InvalidQuantity` for a quantity below 1 or above the per-line cap,
    /// and `InvalidPrice` for a negative catalog price. On any failure the
    /// ledger is unchanged.
    ///
    /// Adding a product that is already present appends a second line
    /// rather than merging quantities.
    pub fn add_item(&mut self, product: &CatalogProduct, quantity: i64) -> LedgerResult<()> {
        if product.id.trim().is_empty() {
            return Err(LedgerError::NoProductSelected);
        }
        if quantity < 1 || quantity > MAX_LINE_QUANTITY {
            return Err(LedgerError::InvalidQuantity {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if product.price_cents < 0 {
            return Err(LedgerError::InvalidPrice {
                cents: product.price_cents,
            });
        }

        self.items.push(LineItem {
            product_ref: product.id.clone(),
            product_name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            stock_ceiling: product.stock_quantity,
            added_at: Utc::now(),
        });

        // The validated item set no longer exists.
        self.verdicts.clear();
        self.touch();
        Ok(())
    }

    /// Replaces the quantity of the first line matching `product_ref`.
    ///
    /// Duplicate refs each carry their own add-time stock ceiling, so only
    /// the first match is guarded and written; later duplicates keep their
    /// own quantities. Fails with `InvalidQuantity` when the new quantity
    /// is below 1 or above that line's stock ceiling; the stored quantity
    /// is then left unchanged. Only the updated item's verdict goes stale.
    pub fn update_quantity(&mut self, product_ref: &str, quantity: i64) -> LedgerResult<()> {
        let Some(index) = self.items.iter().position(|i| i.product_ref == product_ref) else {
            return Err(LedgerError::NoProductSelected);
        };

        let max = self.items[index].quantity_ceiling();
        if quantity < 1 || quantity > max {
            return Err(LedgerError::InvalidQuantity {
                requested: quantity,
                max,
            });
        }

        self.items[index].quantity = quantity;
        self.verdicts.remove(product_ref);
        self.touch();
        Ok(())
    }

    /// Removes the line(s) matching `product_ref`.
    ///
    /// A missing reference is a no-op, not an error; the revision only
    /// moves when something was actually removed.
    pub fn remove_item(&mut self, product_ref: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.product_ref != product_ref);

        if self.items.len() != before {
            self.verdicts.remove(product_ref);
            self.touch();
        }
    }

    /// Selects the target supplier or customer.
    ///
    /// Verdicts are keyed to the party the service judged against, so a
    /// party change drops all of them.
    pub fn set_party(&mut self, party: Party) {
        if self.party.as_ref() == Some(&party) {
            return;
        }
        self.party = Some(party);
        self.verdicts.clear();
        self.touch();
    }

    /// Sets the shipping and tax amounts. Does not affect verdicts.
    pub fn set_surcharges(&mut self, surcharges: Surcharges) {
        self.surcharges = surcharges;
    }

    /// Returns the ledger to its initial empty state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.party = None;
        self.surcharges = Surcharges::zero();
        self.verdicts.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // -------------------------------------------------------------------------
    // Verdict Merge
    // -------------------------------------------------------------------------

    /// Merges a validation report taken at fingerprint `at`.
    ///
    /// Returns `false` without touching anything when the ledger has moved
    /// on since the request was sent; the caller must then discard the
    /// report. Items the report does not mention become valid-by-omission.
    pub fn apply_report(&mut self, report: &ValidationReport, at: Fingerprint) -> bool {
        if at != self.fingerprint() {
            return false;
        }

        self.verdicts = self
            .items
            .iter()
            .map(|item| (item.product_ref.clone(), report.verdict_for(&item.product_ref)))
            .collect();
        true
    }

    /// Drops every stored verdict, returning all items to pending.
    ///
    /// Used when validation fails entirely: unknown, not invalid.
    pub fn clear_verdicts(&mut self) {
        self.verdicts.clear();
    }

    /// Display state of one line's validation.
    pub fn item_status(&self, product_ref: &str) -> ItemStatus {
        match self.verdicts.get(product_ref) {
            None => ItemStatus::Pending,
            Some(v) if v.is_valid => ItemStatus::Valid,
            Some(v) => ItemStatus::Invalid {
                critical: v.is_critical,
                message: v.message.clone(),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current staleness fingerprint.
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(self.revision)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn party(&self) -> Option<&Party> {
        self.party.as_ref()
    }

    pub fn surcharges(&self) -> Surcharges {
        self.surcharges
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines (duplicate product refs count separately).
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Delegates to the pricing calculator.
    pub fn totals(&self) -> Totals {
        pricing::totals(&self.items, self.surcharges)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::ItemIssue;

    fn product(id: &str, price_cents: i64, stock: Option<i64>) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            stock_quantity: stock,
        }
    }

    fn party(id: &str) -> Party {
        Party {
            id: id.to_string(),
            name: format!("Party {id}"),
            organization: None,
        }
    }

    #[test]
    fn test_add_item() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 999, None), 2).unwrap();

        assert_eq!(ledger.line_count(), 1);
        assert_eq!(ledger.items()[0].line_total().cents(), 1998);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut ledger = Ledger::new();

        assert_eq!(
            ledger.add_item(&product("P1", 999, None), 0),
            Err(LedgerError::InvalidQuantity {
                requested: 0,
                max: MAX_LINE_QUANTITY
            })
        );
        assert_eq!(
            ledger.add_item(&product("P1", -1, None), 1),
            Err(LedgerError::InvalidPrice { cents: -1 })
        );
        assert_eq!(
            ledger.add_item(&product("", 999, None), 1),
            Err(LedgerError::NoProductSelected)
        );
        assert!(ledger.is_empty());

        // quantity 1 at price 0 is a legal free item
        ledger.add_item(&product("P1", 0, None), 1).unwrap();
        assert_eq!(ledger.line_count(), 1);
    }

    #[test]
    fn test_duplicate_add_appends() {
        let mut ledger = Ledger::new();
        let p = product("P1", 500, None);

        ledger.add_item(&p, 1).unwrap();
        ledger.add_item(&p, 2).unwrap();

        // Two separate lines, not one merged line of 3.
        assert_eq!(ledger.line_count(), 2);
        assert_eq!(ledger.totals().subtotal.cents(), 1500);
    }

    #[test]
    fn test_update_quantity_respects_stock_ceiling() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, Some(5)), 2).unwrap();

        let err = ledger.update_quantity("P1", 6).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidQuantity {
                requested: 6,
                max: 5
            }
        );
        // Rejection left the quantity untouched.
        assert_eq!(ledger.items()[0].quantity, 2);

        ledger.update_quantity("P1", 5).unwrap();
        assert_eq!(ledger.items()[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_touches_only_first_duplicate_line() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, Some(5)), 1).unwrap();
        ledger.add_item(&product("P1", 500, Some(2)), 1).unwrap();

        // Guarded by the first line's ceiling (5), not the second's (2).
        ledger.update_quantity("P1", 4).unwrap();

        assert_eq!(ledger.items()[0].quantity, 4);
        // The later duplicate keeps its own quantity under its own ceiling.
        assert_eq!(ledger.items()[1].quantity, 1);

        let err = ledger.update_quantity("P1", 6).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidQuantity {
                requested: 6,
                max: 5
            }
        );
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        let fp = ledger.fingerprint();

        ledger.remove_item("P2");
        assert_eq!(ledger.line_count(), 1);
        assert_eq!(ledger.fingerprint(), fp);

        ledger.remove_item("P1");
        assert!(ledger.is_empty());
        assert_ne!(ledger.fingerprint(), fp);
    }

    #[test]
    fn test_mutations_move_fingerprint() {
        let mut ledger = Ledger::new();
        let fp0 = ledger.fingerprint();

        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        let fp1 = ledger.fingerprint();
        assert_ne!(fp0, fp1);

        ledger.update_quantity("P1", 2).unwrap();
        let fp2 = ledger.fingerprint();
        assert_ne!(fp1, fp2);

        ledger.set_party(party("S1"));
        assert_ne!(fp2, ledger.fingerprint());

        // Re-selecting the same party changes nothing.
        let fp3 = ledger.fingerprint();
        ledger.set_party(party("S1"));
        assert_eq!(fp3, ledger.fingerprint());
    }

    #[test]
    fn test_apply_report_merges_and_omits() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        ledger.add_item(&product("P2", 700, None), 1).unwrap();

        let report = ValidationReport {
            is_valid: false,
            invalid_items: vec![ItemIssue {
                product_ref: "P1".to_string(),
                product_name: "Product P1".to_string(),
                is_critical: true,
                message: "discontinued".to_string(),
            }],
        };

        assert!(ledger.apply_report(&report, ledger.fingerprint()));
        assert_eq!(
            ledger.item_status("P1"),
            ItemStatus::Invalid {
                critical: true,
                message: "discontinued".to_string()
            }
        );
        // P2 had no issue entry: valid by omission.
        assert_eq!(ledger.item_status("P2"), ItemStatus::Valid);
    }

    #[test]
    fn test_apply_report_rejects_stale_fingerprint() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        let fp = ledger.fingerprint();

        // The ledger moves on before the response lands.
        ledger.update_quantity("P1", 3).unwrap();

        assert!(!ledger.apply_report(&ValidationReport::all_valid(), fp));
        assert_eq!(ledger.item_status("P1"), ItemStatus::Pending);
    }

    #[test]
    fn test_mutations_drop_verdicts() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        ledger.add_item(&product("P2", 700, None), 1).unwrap();
        assert!(ledger.apply_report(&ValidationReport::all_valid(), ledger.fingerprint()));

        // Quantity change only stales that item.
        ledger.update_quantity("P1", 2).unwrap();
        assert_eq!(ledger.item_status("P1"), ItemStatus::Pending);
        assert_eq!(ledger.item_status("P2"), ItemStatus::Valid);

        // A new line stales everything.
        ledger.add_item(&product("P3", 100, None), 1).unwrap();
        assert_eq!(ledger.item_status("P2"), ItemStatus::Pending);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut ledger = Ledger::new();
        ledger.add_item(&product("P1", 500, None), 1).unwrap();
        ledger.set_party(party("S1"));
        ledger.set_surcharges(Surcharges::new(Money::from_cents(500), Money::from_cents(300)));

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.party().is_none());
        assert_eq!(ledger.surcharges(), Surcharges::zero());
        assert_eq!(ledger.totals().total, Money::zero());
    }
}
