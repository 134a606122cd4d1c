//! Collaborator interfaces.
//!
//! Everything that talks to the outside world sits behind one of these traits
//! so the orchestration logic can be driven by real adapters in production
//! and by the deterministic simulation in tests.

use crate::{
    BackendError, ChildChain, ChildChainError, ChildChainRequest, LedgerError, SubmissionError,
    VerificationOutcome, VerificationRequest,
};
use async_trait::async_trait;
use provisioner_types::{Address, CallRequest, CodeTemplate, CreationRequest, Receipt, TxHash};

/// Ledger client.
///
/// State-changing calls block until their own receipt is available. When the
/// client loses track of a broadcast transaction the error must carry its
/// hash (see [`SubmissionError::unacknowledged`]).
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Submit a creation call and wait for its receipt.
    async fn create(&self, request: &CreationRequest) -> Result<Receipt, SubmissionError>;

    /// Submit a configuration call and wait for its receipt.
    async fn call(&self, request: &CallRequest) -> Result<Receipt, SubmissionError>;

    /// Fetch a receipt. `Ok(None)` means not yet included.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError>;

    /// Whether the ledger is the host platform (selects the blob reader branch).
    async fn is_host_platform(&self) -> Result<bool, LedgerError>;

    /// Call an argument-less getter returning an address.
    async fn read_address(&self, target: Address, getter: &str) -> Result<Address, LedgerError>;
}

/// Compiled creation code for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationCode {
    /// Contract name.
    pub contract: String,
    /// `0x`-prefixed creation bytecode.
    pub bytecode: String,
    /// Constructor signature, if the constructor takes arguments.
    pub constructor: Option<String>,
}

/// Resource-creation backend: turns a code template into creation code.
pub trait ContractFactory: Send + Sync {
    /// Produce creation code for `template`. `resource` names raw templates.
    fn creation_code(
        &self,
        resource: &str,
        template: &CodeTemplate,
    ) -> Result<CreationCode, BackendError>;
}

/// Source verification service.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Attempt verification. Implementations must not panic or error.
    async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome;
}

/// Child-chain creation workflow, treated as one opaque call.
#[async_trait]
pub trait ChildChainCreator: Send + Sync {
    async fn create_child_chain(
        &self,
        request: &ChildChainRequest,
    ) -> Result<ChildChain, ChildChainError>;
}
