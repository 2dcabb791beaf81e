//! # Submission Flow
//!
//! The tagged state machine that sequences ledger finalization, remote
//! record creation and the optional follow-on payment capture.
//!
//! ## States
//! ```text
//! Draft ──submit──► Submitting ──ok──► Created ──(deferred method)──► AwaitingPayment
//!                       │                 │                               │
//!                      err                │                     ┌── ok ── ┤ ── err/abort ──┐
//!                       ▼                 │                     ▼         ▼                ▼
//!               SubmissionFailed          │                   Paid  PaymentFailed  PaymentCancelled
//!                 (retry allowed)         │                               (retry allowed)
//!                                         └──── explicit cancel, guarded ────► Cancelled
//! ```
//!
//! - Totals are frozen into [`SubmissionResult`] the instant creation
//!   succeeds; later ledger mutations never touch a submitted record.
//! - A failed submission preserves the ledger so the user can retry.
//! - A failed or dismissed payment leaves the remote record pending;
//!   payment can be retried, and only the explicit guarded cancel action
//!   moves the record to its terminal cancelled state.
//!
//! Duplicate submits are impossible by construction: the flow is owned
//! exclusively (`&mut self` across the await) and any state other than
//! `Draft`/`SubmissionFailed` refuses `submit`.

use serde::Serialize;
use tracing::{debug, info, warn};

use merx_core::{PaymentCapture, PaymentMethod, RecordStatus, Totals, ValidationReport};

use crate::collab::{RecordDraft, RecordStore};
use crate::error::{FlowError, FlowResult};
use crate::session::DraftSession;

// =============================================================================
// Submission Result
// =============================================================================

/// Snapshot of a successfully created record.
///
/// `totals` is frozen at submission time; clearing or mutating the ledger
/// afterwards does not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub remote_id: String,
    pub status: RecordStatus,
    pub totals: Totals,
}

// =============================================================================
// Flow State
// =============================================================================

/// Where a draft is in its submission/payment lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum FlowState {
    Draft,
    Submitting,
    Created { result: SubmissionResult },
    SubmissionFailed { reason: String },
    AwaitingPayment { result: SubmissionResult },
    Paid { result: SubmissionResult, capture: PaymentCapture },
    PaymentFailed { result: SubmissionResult, reason: String },
    PaymentCancelled { result: SubmissionResult },
    Cancelled { result: SubmissionResult },
}

impl FlowState {
    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Draft => "draft",
            FlowState::Submitting => "submitting",
            FlowState::Created { .. } => "created",
            FlowState::SubmissionFailed { .. } => "submission_failed",
            FlowState::AwaitingPayment { .. } => "awaiting_payment",
            FlowState::Paid { .. } => "paid",
            FlowState::PaymentFailed { .. } => "payment_failed",
            FlowState::PaymentCancelled { .. } => "payment_cancelled",
            FlowState::Cancelled { .. } => "cancelled",
        }
    }

    /// The frozen submission result, once one exists.
    pub fn result(&self) -> Option<&SubmissionResult> {
        match self {
            FlowState::Created { result }
            | FlowState::AwaitingPayment { result }
            | FlowState::Paid { result, .. }
            | FlowState::PaymentFailed { result, .. }
            | FlowState::PaymentCancelled { result }
            | FlowState::Cancelled { result } => Some(result),
            _ => None,
        }
    }
}

// =============================================================================
// Submission Flow
// =============================================================================

/// Sequences one draft's submission against the remote record store.
pub struct SubmissionFlow<S> {
    store: S,
    /// Chosen settlement method; `None` for purchase invoices, which have
    /// no payment leg at all.
    payment_method: Option<PaymentMethod>,
    state: FlowState,
}

impl<S: RecordStore> SubmissionFlow<S> {
    /// Flow for an admin purchase invoice: no payment leg.
    pub fn invoice(store: S) -> Self {
        SubmissionFlow {
            store,
            payment_method: None,
            state: FlowState::Draft,
        }
    }

    /// Flow for a customer order with the chosen settlement method.
    pub fn order(store: S, method: PaymentMethod) -> Self {
        SubmissionFlow {
            store,
            payment_method: Some(method),
            state: FlowState::Draft,
        }
    }

    /// Current state, as plain data for display.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Pure cancel guard, for deciding whether to offer the action at all.
    pub fn can_cancel(status: RecordStatus) -> bool {
        status.is_cancellable()
    }

    // -------------------------------------------------------------------------
    // Draft -> Submitting -> {Created, SubmissionFailed}
    // -------------------------------------------------------------------------

    /// Finalizes the ledger and creates the record remotely.
    ///
    /// Guards, in order: the flow must be in `Draft` or `SubmissionFailed`;
    /// the ledger must have items and a selected party; a validation report
    /// with critical issues blocks outright; one with only non-critical
    /// issues requires `override_non_critical`.
    ///
    /// On success the totals are frozen, the ledger is cleared and the flow
    /// reaches `Created` (or `AwaitingPayment` for a deferred method). On
    /// remote failure the ledger is preserved and `submit` may be retried.
    pub async fn submit(
        &mut self,
        session: &DraftSession,
        report: Option<&ValidationReport>,
        override_non_critical: bool,
    ) -> FlowResult<&FlowState> {
        match self.state {
            FlowState::Draft | FlowState::SubmissionFailed { .. } => {}
            ref other => {
                return Err(FlowError::InvalidState { state: other.name() });
            }
        }

        let snapshot = session.snapshot();
        let party = snapshot.party.ok_or(FlowError::MissingParty)?;
        if snapshot.items.is_empty() {
            return Err(FlowError::EmptyDraft);
        }

        if let Some(report) = report {
            if !report.is_valid {
                if report.has_critical() {
                    return Err(FlowError::CriticalValidationFailure {
                        count: report.critical_count(),
                    });
                }
                if !override_non_critical {
                    return Err(FlowError::OverrideRequired);
                }
                debug!("submitting with non-critical validation issues overridden");
            }
        }

        self.state = FlowState::Submitting;
        let draft = RecordDraft {
            kind: session.kind(),
            party,
            items: snapshot.items,
            totals: snapshot.totals,
            payment_method: self.payment_method,
        };

        match self.store.create(&draft).await {
            Ok(created) => {
                info!(
                    session = %session.id(),
                    remote_id = %created.remote_id,
                    status = %created.status,
                    total = %created.totals.total,
                    "record created"
                );
                // Freeze the totals computed at submission time.
                let result = SubmissionResult {
                    remote_id: created.remote_id,
                    status: created.status,
                    totals: snapshot.totals,
                };
                session.with_ledger_mut(|l| l.clear());

                let deferred = self.payment_method.is_some_and(|m| m.is_deferred());
                self.state = if deferred {
                    FlowState::AwaitingPayment { result }
                } else {
                    FlowState::Created { result }
                };
                Ok(&self.state)
            }
            Err(err) => {
                warn!(error = %err, "record creation failed, draft preserved");
                let reason = err.message();
                self.state = FlowState::SubmissionFailed { reason: reason.clone() };
                Err(FlowError::SubmissionFailed(reason))
            }
        }
    }

    // -------------------------------------------------------------------------
    // AwaitingPayment -> {Paid, PaymentFailed, PaymentCancelled}
    // -------------------------------------------------------------------------

    /// Reports a successful external capture and marks the record paid.
    pub async fn complete_payment(&mut self, capture: PaymentCapture) -> FlowResult<&FlowState> {
        let result = self.awaiting_result()?;

        match self.store.mark_paid(&result.remote_id, &capture).await {
            Ok(status) => {
                info!(remote_id = %result.remote_id, transaction = %capture.transaction_id, "payment captured");
                self.state = FlowState::Paid {
                    result: SubmissionResult { status, ..result },
                    capture,
                };
                Ok(&self.state)
            }
            Err(err) => {
                warn!(error = %err, "mark-paid failed, record stays pending");
                let reason = err.message();
                self.state = FlowState::PaymentFailed {
                    result,
                    reason: reason.clone(),
                };
                Err(FlowError::PaymentFailed(reason))
            }
        }
    }

    /// Records an error reported by the external payment provider.
    ///
    /// The remote record stays pending; payment may be retried.
    pub fn fail_payment(&mut self, reason: impl Into<String>) -> FlowResult<&FlowState> {
        let result = self.awaiting_result()?;
        self.state = FlowState::PaymentFailed {
            result,
            reason: reason.into(),
        };
        Ok(&self.state)
    }

    /// Records that the user dismissed the external payment step.
    ///
    /// Not a record cancellation: the remote record stays pending.
    pub fn cancel_payment(&mut self) -> FlowResult<&FlowState> {
        let result = self.awaiting_result()?;
        self.state = FlowState::PaymentCancelled { result };
        Ok(&self.state)
    }

    /// Re-enters `AwaitingPayment` after a failed or dismissed capture.
    pub fn retry_payment(&mut self) -> FlowResult<&FlowState> {
        match &self.state {
            FlowState::PaymentFailed { result, .. } | FlowState::PaymentCancelled { result } => {
                self.state = FlowState::AwaitingPayment { result: result.clone() };
                Ok(&self.state)
            }
            other => Err(FlowError::InvalidState { state: other.name() }),
        }
    }

    fn awaiting_result(&self) -> FlowResult<SubmissionResult> {
        match &self.state {
            FlowState::AwaitingPayment { result } => Ok(result.clone()),
            other => Err(FlowError::InvalidState { state: other.name() }),
        }
    }

    // -------------------------------------------------------------------------
    // Explicit Cancel (guarded)
    // -------------------------------------------------------------------------

    /// Explicit, user-initiated cancellation of the submitted record.
    ///
    /// Re-reads the freshest remote status first: a record that is already
    /// shipped, delivered or cancelled refuses with `NotCancellable`.
    pub async fn cancel(&mut self) -> FlowResult<&FlowState> {
        let result = match &self.state {
            FlowState::Created { result }
            | FlowState::AwaitingPayment { result }
            | FlowState::PaymentFailed { result, .. }
            | FlowState::PaymentCancelled { result } => result.clone(),
            other => return Err(FlowError::InvalidState { state: other.name() }),
        };

        let freshest = self
            .store
            .get_by_id(&result.remote_id)
            .await
            .map_err(|e| FlowError::StoreUnavailable(e.message()))?
            .map(|summary| summary.status)
            .unwrap_or(result.status);

        if !freshest.is_cancellable() {
            return Err(FlowError::NotCancellable { status: freshest });
        }

        let status = self
            .store
            .cancel(&result.remote_id)
            .await
            .map_err(|e| FlowError::StoreUnavailable(e.message()))?;

        info!(remote_id = %result.remote_id, "record cancelled");
        self.state = FlowState::Cancelled {
            result: SubmissionResult { status, ..result },
        };
        Ok(&self.state)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use merx_core::{
        CatalogProduct, ItemIssue, Money, Party, RecordKind, Surcharges, ValidationReport,
    };

    use super::*;
    use crate::collab::{CreatedRecord, RecordFilter, RecordPage, RecordSummary, RemoteError};

    /// Scriptable in-memory record store.
    struct MockStore {
        fail_create: AtomicBool,
        remote_status: Mutex<RecordStatus>,
        created: Mutex<Vec<RecordDraft>>,
        paid_with: Mutex<Option<PaymentCapture>>,
    }

    impl MockStore {
        fn new() -> Arc<Self> {
            Arc::new(MockStore {
                fail_create: AtomicBool::new(false),
                remote_status: Mutex::new(RecordStatus::Pending),
                created: Mutex::new(Vec::new()),
                paid_with: Mutex::new(None),
            })
        }

        fn set_remote_status(&self, status: RecordStatus) {
            *self.remote_status.lock().unwrap() = status;
        }
    }

    #[async_trait]
    impl RecordStore for Arc<MockStore> {
        async fn create(&self, draft: &RecordDraft) -> Result<CreatedRecord, RemoteError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(RemoteError::Remote {
                    status: 500,
                    message: "store exploded".to_string(),
                });
            }
            self.created.lock().unwrap().push(draft.clone());
            Ok(CreatedRecord {
                remote_id: "O1".to_string(),
                status: RecordStatus::Pending,
                totals: draft.totals,
            })
        }

        async fn cancel(&self, _remote_id: &str) -> Result<RecordStatus, RemoteError> {
            self.set_remote_status(RecordStatus::Cancelled);
            Ok(RecordStatus::Cancelled)
        }

        async fn mark_paid(
            &self,
            _remote_id: &str,
            capture: &PaymentCapture,
        ) -> Result<RecordStatus, RemoteError> {
            *self.paid_with.lock().unwrap() = Some(capture.clone());
            self.set_remote_status(RecordStatus::Processing);
            Ok(RecordStatus::Processing)
        }

        async fn delete(&self, _remote_id: &str) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn get_by_id(&self, remote_id: &str) -> Result<Option<RecordSummary>, RemoteError> {
            Ok(Some(RecordSummary {
                remote_id: remote_id.to_string(),
                kind: RecordKind::Order,
                status: *self.remote_status.lock().unwrap(),
                totals: Totals::default(),
            }))
        }

        async fn list(&self, _filter: &RecordFilter) -> Result<RecordPage, RemoteError> {
            Ok(RecordPage {
                records: Vec::new(),
                page: 1,
                total_pages: 0,
                total_records: 0,
            })
        }
    }

    fn product(id: &str, price_cents: i64) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            stock_quantity: None,
        }
    }

    fn party(id: &str) -> Party {
        Party {
            id: id.to_string(),
            name: format!("Party {id}"),
            organization: None,
        }
    }

    /// Ledger from the end-to-end scenario: 3 x 10.00, shipping 5, tax 3.
    fn ready_session() -> DraftSession {
        let session = DraftSession::new(RecordKind::Order);
        session.with_ledger_mut(|l| {
            l.set_party(party("C1"));
            l.add_item(&product("P1", 1000), 3).unwrap();
            l.set_surcharges(Surcharges::new(Money::from_cents(500), Money::from_cents(300)));
        });
        session
    }

    fn capture() -> PaymentCapture {
        PaymentCapture {
            transaction_id: "TX-9".to_string(),
            status: "COMPLETED".to_string(),
            pay_time: Utc::now(),
            payer_email: "buyer@example.com".to_string(),
        }
    }

    fn non_critical_report() -> ValidationReport {
        ValidationReport {
            is_valid: false,
            invalid_items: vec![ItemIssue {
                product_ref: "P1".to_string(),
                product_name: "Product P1".to_string(),
                is_critical: false,
                message: "price drifted since add".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_end_to_end_create_freezes_totals() {
        let store = MockStore::new();
        let session = ready_session();
        assert_eq!(session.totals().total.cents(), 3800);

        let mut flow = SubmissionFlow::order(Arc::clone(&store), PaymentMethod::CashOnDelivery);
        let state = flow.submit(&session, None, false).await.unwrap();

        let result = state.result().unwrap();
        assert_eq!(result.remote_id, "O1");
        assert_eq!(result.status, RecordStatus::Pending);
        assert_eq!(result.totals.total.cents(), 3800);
        assert_eq!(state.name(), "created");

        // Ledger was cleared by the successful submission...
        assert!(session.with_ledger(|l| l.is_empty()));

        // ...and a later clear does not alter the frozen snapshot.
        session.with_ledger_mut(|l| l.clear());
        assert_eq!(flow.state().result().unwrap().totals.total.cents(), 3800);
    }

    #[tokio::test]
    async fn test_deferred_method_enters_awaiting_payment() {
        let store = MockStore::new();
        let session = ready_session();

        let mut flow = SubmissionFlow::order(store, PaymentMethod::PayPal);
        let state = flow.submit(&session, None, false).await.unwrap();
        assert_eq!(state.name(), "awaiting_payment");
    }

    #[tokio::test]
    async fn test_submit_guards() {
        let store = MockStore::new();
        let mut flow = SubmissionFlow::invoice(Arc::clone(&store));

        // Empty ledger.
        let session = DraftSession::new(RecordKind::PurchaseInvoice);
        assert_eq!(
            flow.submit(&session, None, false).await.unwrap_err(),
            FlowError::MissingParty
        );
        session.with_ledger_mut(|l| l.set_party(party("S1")));
        assert_eq!(
            flow.submit(&session, None, false).await.unwrap_err(),
            FlowError::EmptyDraft
        );

        session
            .with_ledger_mut(|l| l.add_item(&product("P1", 100), 1))
            .unwrap();

        // Critical issues block unconditionally, even with override.
        let critical = ValidationReport {
            is_valid: false,
            invalid_items: vec![ItemIssue {
                product_ref: "P1".to_string(),
                product_name: "Product P1".to_string(),
                is_critical: true,
                message: "discontinued".to_string(),
            }],
        };
        assert_eq!(
            flow.submit(&session, Some(&critical), true).await.unwrap_err(),
            FlowError::CriticalValidationFailure { count: 1 }
        );

        // Non-critical issues need the explicit override.
        assert_eq!(
            flow.submit(&session, Some(&non_critical_report()), false)
                .await
                .unwrap_err(),
            FlowError::OverrideRequired
        );
        assert!(store.created.lock().unwrap().is_empty());

        flow.submit(&session, Some(&non_critical_report()), true)
            .await
            .unwrap();
        assert_eq!(store.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_preserves_ledger_and_retries() {
        let store = MockStore::new();
        store.fail_create.store(true, Ordering::SeqCst);
        let session = ready_session();

        let mut flow = SubmissionFlow::order(Arc::clone(&store), PaymentMethod::CashOnDelivery);
        let err = flow.submit(&session, None, false).await.unwrap_err();
        assert_eq!(err, FlowError::SubmissionFailed("store exploded".to_string()));
        assert_eq!(flow.state().name(), "submission_failed");

        // Draft survived; the retry goes through once the store recovers.
        assert_eq!(session.with_ledger(|l| l.line_count()), 1);
        store.fail_create.store(false, Ordering::SeqCst);
        let state = flow.submit(&session, None, false).await.unwrap();
        assert_eq!(state.name(), "created");
    }

    #[tokio::test]
    async fn test_double_submit_rejected() {
        let store = MockStore::new();
        let session = ready_session();
        let mut flow = SubmissionFlow::order(store, PaymentMethod::CashOnDelivery);

        flow.submit(&session, None, false).await.unwrap();
        assert_eq!(
            flow.submit(&session, None, false).await.unwrap_err(),
            FlowError::InvalidState { state: "created" }
        );
    }

    #[tokio::test]
    async fn test_payment_capture_marks_paid() {
        let store = MockStore::new();
        let session = ready_session();
        let mut flow = SubmissionFlow::order(Arc::clone(&store), PaymentMethod::PayPal);
        flow.submit(&session, None, false).await.unwrap();

        let state = flow.complete_payment(capture()).await.unwrap();
        assert_eq!(state.name(), "paid");
        assert_eq!(
            store.paid_with.lock().unwrap().as_ref().unwrap().transaction_id,
            "TX-9"
        );
    }

    #[tokio::test]
    async fn test_payment_failure_keeps_record_pending_and_retries() {
        let store = MockStore::new();
        let session = ready_session();
        let mut flow = SubmissionFlow::order(store, PaymentMethod::PayPal);
        flow.submit(&session, None, false).await.unwrap();

        flow.fail_payment("window closed").unwrap();
        assert_eq!(flow.state().name(), "payment_failed");
        // The frozen result survives the failed attempt.
        assert_eq!(flow.state().result().unwrap().status, RecordStatus::Pending);

        flow.retry_payment().unwrap();
        assert_eq!(flow.state().name(), "awaiting_payment");

        flow.cancel_payment().unwrap();
        assert_eq!(flow.state().name(), "payment_cancelled");
        flow.retry_payment().unwrap();
        assert_eq!(flow.state().name(), "awaiting_payment");
    }

    #[tokio::test]
    async fn test_cancel_guard_checks_freshest_status() {
        let store = MockStore::new();
        let session = ready_session();
        let mut flow = SubmissionFlow::order(Arc::clone(&store), PaymentMethod::CashOnDelivery);
        flow.submit(&session, None, false).await.unwrap();

        // Meanwhile the warehouse shipped it.
        store.set_remote_status(RecordStatus::Shipped);
        assert_eq!(
            flow.cancel().await.unwrap_err(),
            FlowError::NotCancellable {
                status: RecordStatus::Shipped
            }
        );
        assert_eq!(flow.state().name(), "created");

        // A pending record cancels fine.
        store.set_remote_status(RecordStatus::Pending);
        let state = flow.cancel().await.unwrap();
        assert_eq!(state.name(), "cancelled");
        assert_eq!(state.result().unwrap().status, RecordStatus::Cancelled);
    }

    #[test]
    fn test_can_cancel_predicate() {
        assert!(SubmissionFlow::<Arc<MockStore>>::can_cancel(RecordStatus::Pending));
        assert!(!SubmissionFlow::<Arc<MockStore>>::can_cancel(RecordStatus::Delivered));
    }
}
