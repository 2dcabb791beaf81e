//! # Draft Session
//!
//! One session per in-progress checkout or invoice draft.
//!
//! ## Thread Safety
//! The ledger is wrapped in `Arc<Mutex<Ledger>>` because the orchestrator
//! snapshots it before its remote round-trip and merges after, while UI
//! mutations keep landing in between. Locks are held only for synchronous
//! closures, never across an await.

use std::sync::{Arc, Mutex};

use merx_core::{pricing, Fingerprint, Ledger, LineItem, Party, RecordKind, Totals};
use uuid::Uuid;

/// Shared handle to one draft's ledger.
///
/// Sessions own their state exclusively; nothing is shared between two
/// sessions. Cloning the session clones the handle, not the ledger.
#[derive(Debug, Clone)]
pub struct DraftSession {
    id: Uuid,
    kind: RecordKind,
    ledger: Arc<Mutex<Ledger>>,
}

/// Snapshot of everything a remote call needs, taken under the lock.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub fingerprint: Fingerprint,
    pub party: Option<Party>,
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

impl DraftSession {
    /// Opens a new empty draft of the given kind.
    pub fn new(kind: RecordKind) -> Self {
        DraftSession {
            id: Uuid::new_v4(),
            kind,
            ledger: Arc::new(Mutex::new(Ledger::new())),
        }
    }

    /// Session identifier, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The kind of record this draft produces.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Executes a closure with read access to the ledger.
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        let ledger = self.ledger.lock().expect("ledger mutex poisoned");
        f(&ledger)
    }

    /// Executes a closure with write access to the ledger.
    pub fn with_ledger_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ledger) -> R,
    {
        let mut ledger = self.ledger.lock().expect("ledger mutex poisoned");
        f(&mut ledger)
    }

    /// Takes a consistent snapshot for a remote round-trip.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.with_ledger(|l| LedgerSnapshot {
            fingerprint: l.fingerprint(),
            party: l.party().cloned(),
            items: l.items().to_vec(),
            totals: l.totals(),
        })
    }

    /// Applies the order checkout's standard surcharge policy to the
    /// current subtotal: flat shipping plus 10% tax.
    ///
    /// The checkout screen calls this after every item mutation. Invoice
    /// drafts never do; their surcharges are operator input via
    /// `set_surcharges`.
    pub fn apply_standard_surcharges(&self) {
        self.with_ledger_mut(|l| {
            let subtotal = l.totals().subtotal;
            l.set_surcharges(pricing::standard_surcharges(subtotal));
        });
    }

    /// Current totals, for display.
    pub fn totals(&self) -> Totals {
        self.with_ledger(Ledger::totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merx_core::CatalogProduct;

    fn product(id: &str, price_cents: i64) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            stock_quantity: None,
        }
    }

    #[test]
    fn test_sessions_are_independent() {
        let a = DraftSession::new(RecordKind::Order);
        let b = DraftSession::new(RecordKind::Order);

        a.with_ledger_mut(|l| l.add_item(&product("P1", 500), 1)).unwrap();

        assert_eq!(a.with_ledger(|l| l.line_count()), 1);
        assert_eq!(b.with_ledger(|l| l.line_count()), 0);
    }

    #[test]
    fn test_standard_surcharges_follow_subtotal() {
        let session = DraftSession::new(RecordKind::Order);
        session
            .with_ledger_mut(|l| l.add_item(&product("P1", 2998), 1))
            .unwrap();
        session.apply_standard_surcharges();

        let t = session.totals();
        assert_eq!(t.shipping.cents(), 1000);
        // 29.98 x 10% rounds half up to 3.00.
        assert_eq!(t.tax.cents(), 300);
        assert_eq!(t.total.cents(), 2998 + 1000 + 300);
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let session = DraftSession::new(RecordKind::PurchaseInvoice);
        session
            .with_ledger_mut(|l| l.add_item(&product("P1", 1000), 3))
            .unwrap();

        let snap = session.snapshot();
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.totals.subtotal.cents(), 3000);
        assert_eq!(snap.fingerprint, session.with_ledger(|l| l.fingerprint()));
    }
}
