//! Transaction receipts and their classification.

use crate::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Execution status recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// Status `1`: the transaction executed successfully.
    Success,
    /// Status `0`: the transaction was included but reverted.
    Failure,
}

/// The ledger's durable record of a transaction's inclusion and outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the included transaction.
    pub tx_hash: TxHash,
    /// Execution status.
    pub status: ReceiptStatus,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Address of the resource created by this transaction, if it was a creation.
    pub contract_address: Option<Address>,
    /// Call target, absent for creations.
    pub to: Option<Address>,
}

impl Receipt {
    /// Whether the transaction executed successfully.
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// Terminal classification of a transaction as observed by polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Included with a success status.
    Confirmed(Receipt),
    /// Included with a failure status. Always a hard failure for the caller.
    Reverted(Receipt),
    /// No terminal state observed within the wait budget. Still unresolved.
    TimedOut,
}

impl TransactionOutcome {
    /// Classify an observed receipt.
    pub fn from_receipt(receipt: Receipt) -> Self {
        if receipt.is_success() {
            Self::Confirmed(receipt)
        } else {
            Self::Reverted(receipt)
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "confirmed",
            Self::Reverted(_) => "reverted",
            Self::TimedOut => "timed-out",
        }
    }
}
