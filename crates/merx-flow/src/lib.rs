//! # merx-flow: Draft Orchestration for merx
//!
//! Everything async about an invoice or checkout draft:
//!
//! - [`session`] - one [`DraftSession`] per draft, owning its ledger
//! - [`orchestrator`] - the validation round-trip with the fingerprint
//!   guard that discards stale responses
//! - [`submission`] - the tagged submission/payment state machine
//! - [`collab`] - abstract contracts for the remote collaborators
//! - [`cache`] - the cached-or-remote query layer
//! - [`error`] - the flow failure taxonomy
//!
//! ## Concurrency Model
//! Single ledger owner per session, cooperative scheduling. Remote calls
//! never hold the ledger lock; the only real race (a mutation overtaking an
//! outstanding validation response) is resolved by the fingerprint guard in
//! [`orchestrator`]. Duplicate submission is prevented by exclusive
//! ownership of the [`submission::SubmissionFlow`] plus its state guard.

pub mod cache;
pub mod collab;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod submission;

pub use cache::QueryCache;
pub use collab::{
    CatalogService, CreatedRecord, ProductFilter, RecordDraft, RecordFilter, RecordPage,
    RecordStore, RecordSummary, RemoteError, ValidationService,
};
pub use error::{FlowError, FlowResult};
pub use orchestrator::{ValidationOrchestrator, ValidationOutcome};
pub use session::{DraftSession, LedgerSnapshot};
pub use submission::{FlowState, SubmissionFlow, SubmissionResult};
