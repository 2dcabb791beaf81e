//! # Flow Errors
//!
//! Failure taxonomy for the draft orchestration layer.
//!
//! Local input errors (`Ledger`) are synchronous and leave the draft
//! unchanged. Remote failures (`ValidationUnavailable`, `SubmissionFailed`,
//! `PaymentFailed`) carry the remote message when one was available and are
//! never fatal to the session: the draft survives and may be retried.
//! `NotCancellable` is a guard check, evaluated before the cancel action is
//! even offered.

use merx_core::{LedgerError, RecordStatus};
use thiserror::Error;

/// Errors surfaced by sessions, the orchestrator and the submission flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The draft has no line items.
    #[error("draft has no line items")]
    EmptyDraft,

    /// No supplier or customer was selected for the draft.
    #[error("no supplier or customer selected")]
    MissingParty,

    /// The latest validation report contains critical issues; submission is
    /// blocked unconditionally.
    #[error("validation found {count} critical issue(s), submission blocked")]
    CriticalValidationFailure { count: usize },

    /// The latest validation report contains only non-critical issues;
    /// submission needs the explicit override flag.
    #[error("validation found non-critical issues, explicit confirmation required")]
    OverrideRequired,

    /// The validation service could not be reached or answered with an
    /// error. Verdicts are cleared: unknown, not invalid.
    #[error("validation unavailable: {0}")]
    ValidationUnavailable(String),

    /// Remote record creation failed. The ledger is preserved for retry.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// Payment capture or the mark-paid call failed. The record stays
    /// pending remotely and payment may be retried.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// A record store call outside submission/payment failed (status
    /// refresh, cancel, delete, listing).
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    /// The record's freshest remote status forbids cancellation.
    #[error("record with status {status} cannot be cancelled")]
    NotCancellable { status: RecordStatus },

    /// The state machine is not in a state that allows the operation.
    #[error("operation not allowed while {state}")]
    InvalidState { state: &'static str },

    /// A ledger mutation was rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Convenience alias for flow results.
pub type FlowResult<T> = Result<T, FlowError>;
