//! Errors raised by collaborators.

use provisioner_types::{Receipt, TxHash};
use thiserror::Error;

/// Failure of a state-changing remote call.
///
/// Carries a transaction hash only when the client observed a broadcast but
/// not a clean completion. That hash is what makes the failure ambiguous and
/// therefore recoverable; errors without one are hard failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    message: String,
    tx_hash: Option<TxHash>,
}

impl SubmissionError {
    /// The call was rejected before anything reached the ledger.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tx_hash: None,
        }
    }

    /// The transaction was broadcast but its acknowledgement never arrived.
    pub fn unacknowledged(tx_hash: TxHash, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tx_hash: Some(tx_hash),
        }
    }

    /// The transaction was included with a failure status.
    ///
    /// The outcome is already known, so no recovery hash is attached.
    pub fn reverted(receipt: &Receipt) -> Self {
        Self {
            message: format!(
                "transaction {} reverted in block {}",
                receipt.tx_hash, receipt.block_number
            ),
            tx_hash: None,
        }
    }

    /// Hash of the broadcast transaction, if one was observed.
    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure of a read-only ledger query.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The node could not be reached.
    #[error("Ledger transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error.
    #[error("Ledger RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// The response could not be interpreted.
    #[error("Malformed ledger response: {0}")]
    Decode(String),

    /// An external toolchain process failed.
    #[error("Toolchain error: {0}")]
    Toolchain(String),
}

/// Failure of the creation backend to produce creation code.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No compiled artifact exists for the contract.
    #[error("No artifact for contract {contract}")]
    MissingArtifact {
        /// Contract name.
        contract: String,
    },

    /// The artifact exists but could not be used.
    #[error("Invalid artifact for contract {contract}: {reason}")]
    InvalidArtifact {
        /// Contract name.
        contract: String,
        /// What was wrong with it.
        reason: String,
    },

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the child-chain creation collaborator.
#[derive(Debug, Error)]
pub enum ChildChainError {
    /// The creation workflow reported failure.
    #[error("Child chain creation failed: {0}")]
    Failed(String),

    /// The workflow produced output that does not match the expected shape.
    #[error("Child chain creation returned malformed output: {0}")]
    Malformed(String),

    #[error("Child chain creation I/O error: {0}")]
    Io(#[from] std::io::Error),
}
