//! Idempotent resource deployment.
//!
//! Layers, leaves first:
//!
//! - [`TransactionAwaiter`]: polls the ledger until a transaction is included
//!   or the wait budget runs out.
//! - [`IdempotentSubmitter`]: runs one state-changing call and, when the
//!   acknowledgement is lost after broadcast, reconciles against the ledger
//!   instead of re-submitting.
//! - [`ResourceDeployer`]: creates one resource through the submitter and
//!   fires best-effort source verification.
//!
//! # Recovery
//!
//! ```text
//! submit(action)
//!     │
//!     ├── Ok(value) ─────────────────────────────────────► Success
//!     │
//!     └── Err(e)
//!           ├── no tx hash ──────────────────────────────► re-raise e
//!           └── tx hash ──► TransactionAwaiter::wait
//!                             ├── Confirmed(receipt) ──► reconstruct from receipt
//!                             └── Reverted | TimedOut ─► re-raise e
//! ```

mod awaiter;
mod config;
mod deployer;
mod error;
mod submitter;
mod verify;

pub use awaiter::TransactionAwaiter;
pub use config::AwaiterConfig;
pub use deployer::{Deployment, ResourceDeployer};
pub use error::DeployError;
pub use submitter::{
    CallSubmission, CreateSubmission, IdempotentSubmitter, Submission, SubmissionOutcome,
    Submitted,
};
pub use verify::verify_best_effort;
