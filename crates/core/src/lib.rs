//! Collaborator interfaces for rollup provisioning.
//!
//! The orchestration crates depend only on these traits and error types:
//!
//! - [`Ledger`]: creation/configuration submission, receipt lookup, platform query
//! - [`ContractFactory`]: resolves a [`CodeTemplate`](provisioner_types::CodeTemplate) to creation code
//! - [`Verifier`]: best-effort source verification
//! - [`ChildChainCreator`]: the opaque child-chain creation workflow

mod child_chain;
mod error;
mod traits;
mod verification;

pub use child_chain::{ChildChain, ChildChainRequest};
pub use error::{BackendError, ChildChainError, LedgerError, SubmissionError};
pub use traits::{ChildChainCreator, ContractFactory, CreationCode, Ledger, Verifier};
pub use verification::{VerificationOutcome, VerificationRequest};
