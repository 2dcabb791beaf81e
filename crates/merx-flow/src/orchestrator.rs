//! # Validation Orchestrator
//!
//! Sequences the remote line-item validation round-trip for one draft
//! session and merges the verdicts back into the ledger.
//!
//! ## The Fingerprint Guard
//! ```text
//! t0  snapshot {fingerprint, party, items}        (under the ledger lock)
//! t1  POST validate(party, items)                 (lock released)
//! t2  ...user keeps editing the ledger...         (fingerprint moves)
//! t3  response arrives -> compare fingerprints    (under the lock again)
//!       equal     -> merge verdicts, Applied
//!       different -> discard response, Stale
//! ```
//! A mutation arriving while a request is outstanding does not cancel the
//! request; its result is simply discarded on arrival. This is the one
//! correctness-critical protocol in the crate: without the compare, verdicts
//! computed for an old item set would be displayed against a mutated ledger.
//!
//! At most one request is in flight per session. A second call while one is
//! outstanding reports [`ValidationOutcome::AlreadyRunning`] and sends
//! nothing.
//!
//! No timeout is modeled here; caller-level timeouts belong to the HTTP
//! collaborator.

use tracing::{debug, info, warn};

use merx_core::ValidationReport;

use crate::collab::ValidationService;
use crate::error::{FlowError, FlowResult};
use crate::session::DraftSession;

/// What happened to a validation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The response matched the current ledger and was merged.
    Applied(ValidationReport),

    /// The ledger changed while the request was in flight; the response was
    /// discarded and the items stay pending.
    Stale,

    /// Another request for this session is still outstanding; nothing was
    /// sent.
    AlreadyRunning,
}

/// Drives validation round-trips for draft sessions.
pub struct ValidationOrchestrator<V> {
    service: V,
    in_flight: tokio::sync::Mutex<()>,
}

impl<V: ValidationService> ValidationOrchestrator<V> {
    pub fn new(service: V) -> Self {
        ValidationOrchestrator {
            service,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Runs one validation round-trip for `session`.
    ///
    /// Requires a selected party and a non-empty ledger. On transport or
    /// remote failure every displayed verdict is cleared (the items become
    /// unknown, not invalid) and `ValidationUnavailable` is returned.
    pub async fn validate(&self, session: &DraftSession) -> FlowResult<ValidationOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("validation request already in flight, skipping");
            return Ok(ValidationOutcome::AlreadyRunning);
        };

        let snapshot = session.snapshot();
        let party = snapshot.party.ok_or(FlowError::MissingParty)?;
        if snapshot.items.is_empty() {
            return Err(FlowError::EmptyDraft);
        }

        debug!(
            session = %session.id(),
            party = %party.id,
            items = snapshot.items.len(),
            "sending validation request"
        );

        match self.service.validate(&party, &snapshot.items).await {
            Ok(report) => {
                let applied = session
                    .with_ledger_mut(|l| l.apply_report(&report, snapshot.fingerprint));
                if applied {
                    info!(
                        valid = report.is_valid,
                        issues = report.invalid_items.len(),
                        "validation verdicts applied"
                    );
                    Ok(ValidationOutcome::Applied(report))
                } else {
                    debug!("ledger changed during validation, response discarded");
                    Ok(ValidationOutcome::Stale)
                }
            }
            Err(err) => {
                warn!(error = %err, "validation service failed, clearing verdicts");
                session.with_ledger_mut(|l| l.clear_verdicts());
                Err(FlowError::ValidationUnavailable(err.message()))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
