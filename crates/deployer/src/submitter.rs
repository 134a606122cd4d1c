//! Idempotent submission of state-changing calls.

use crate::TransactionAwaiter;
use async_trait::async_trait;
use provisioner_core::{Ledger, SubmissionError};
use provisioner_types::{
    Address, CallRequest, CreationRequest, Receipt, TransactionOutcome, TxHash,
};
use std::sync::Arc;
use tracing::{info, warn};

/// A single state-changing remote call that can be reconciled from a receipt.
#[async_trait]
pub trait Submission: Send + Sync {
    /// Typed result of a successful submission.
    type Output: Send;

    /// Short description for logs.
    fn label(&self) -> &str;

    /// Perform the call and wait for its own receipt.
    async fn execute(&self, ledger: &dyn Ledger) -> Result<Self::Output, SubmissionError>;

    /// Rebuild the result from a confirmed receipt after a lost acknowledgement.
    ///
    /// Returns `None` when the receipt does not belong to this call.
    fn reconstruct(&self, receipt: &Receipt) -> Option<Self::Output>;
}

/// Immediate classification of a submission attempt. Never persisted.
#[derive(Debug)]
pub enum SubmissionOutcome<T> {
    /// The call completed cleanly.
    Success(T),
    /// The call was broadcast but not cleanly acknowledged.
    AmbiguousFailure {
        /// The broadcast transaction.
        tx_hash: TxHash,
        /// The client-side error, kept for re-raising.
        error: SubmissionError,
    },
    /// The call failed with nothing to reconcile.
    HardFailure(SubmissionError),
}

impl<T> SubmissionOutcome<T> {
    /// Classify the raw result of [`Submission::execute`].
    pub fn classify(result: Result<T, SubmissionError>) -> Self {
        match result {
            Ok(value) => SubmissionOutcome::Success(value),
            Err(error) => match error.tx_hash() {
                Some(tx_hash) => SubmissionOutcome::AmbiguousFailure { tx_hash, error },
                None => SubmissionOutcome::HardFailure(error),
            },
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted<T> {
    /// The typed result.
    pub value: T,
    /// Set when the result was reconstructed from the ledger after a lost
    /// acknowledgement.
    pub recovered_from: Option<TxHash>,
}

/// Runs submissions with lost-acknowledgement recovery.
///
/// Never re-submits. An ambiguous failure is reconciled by polling the
/// ledger for the broadcast transaction: confirmation turns it into a
/// success, anything else re-raises the original error unchanged.
#[derive(Clone)]
pub struct IdempotentSubmitter {
    ledger: Arc<dyn Ledger>,
    awaiter: TransactionAwaiter,
}

impl IdempotentSubmitter {
    pub fn new(ledger: Arc<dyn Ledger>, awaiter: TransactionAwaiter) -> Self {
        Self { ledger, awaiter }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Submit once, recovering from a lost acknowledgement.
    pub async fn submit<S: Submission>(
        &self,
        submission: &S,
    ) -> Result<Submitted<S::Output>, SubmissionError> {
        let result = submission.execute(self.ledger.as_ref()).await;

        match SubmissionOutcome::classify(result) {
            SubmissionOutcome::Success(value) => Ok(Submitted {
                value,
                recovered_from: None,
            }),
            SubmissionOutcome::HardFailure(error) => Err(error),
            SubmissionOutcome::AmbiguousFailure { tx_hash, error } => {
                warn!(
                    action = submission.label(),
                    tx = %tx_hash,
                    error = %error,
                    "Submission not acknowledged, checking ledger"
                );
                self.reconcile(submission, tx_hash, error).await
            }
        }
    }

    async fn reconcile<S: Submission>(
        &self,
        submission: &S,
        tx_hash: TxHash,
        error: SubmissionError,
    ) -> Result<Submitted<S::Output>, SubmissionError> {
        match self.awaiter.wait(tx_hash).await {
            TransactionOutcome::Confirmed(receipt) => match submission.reconstruct(&receipt) {
                Some(value) => {
                    info!(
                        action = submission.label(),
                        tx = %tx_hash,
                        block = receipt.block_number,
                        "Recovered submission from confirmed receipt"
                    );
                    Ok(Submitted {
                        value,
                        recovered_from: Some(tx_hash),
                    })
                }
                None => {
                    warn!(
                        action = submission.label(),
                        tx = %tx_hash,
                        "Confirmed receipt does not match submission"
                    );
                    Err(error)
                }
            },
            outcome @ (TransactionOutcome::Reverted(_) | TransactionOutcome::TimedOut) => {
                warn!(
                    action = submission.label(),
                    tx = %tx_hash,
                    outcome = outcome.label(),
                    "Recovery failed"
                );
                Err(error)
            }
        }
    }
}

/// Creation of a new resource. Yields the created address.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    request: CreationRequest,
}

impl CreateSubmission {
    pub fn new(request: CreationRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &CreationRequest {
        &self.request
    }
}

#[async_trait]
impl Submission for CreateSubmission {
    type Output = Address;

    fn label(&self) -> &str {
        &self.request.resource
    }

    async fn execute(&self, ledger: &dyn Ledger) -> Result<Address, SubmissionError> {
        let receipt = ledger.create(&self.request).await?;
        if !receipt.is_success() {
            return Err(SubmissionError::reverted(&receipt));
        }
        receipt.contract_address.ok_or_else(|| {
            SubmissionError::rejected(format!(
                "creation receipt {} carries no contract address",
                receipt.tx_hash
            ))
        })
    }

    fn reconstruct(&self, receipt: &Receipt) -> Option<Address> {
        receipt.contract_address
    }
}

/// Configuration call on an existing resource.
#[derive(Debug, Clone)]
pub struct CallSubmission {
    request: CallRequest,
}

impl CallSubmission {
    pub fn new(request: CallRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &CallRequest {
        &self.request
    }
}

#[async_trait]
impl Submission for CallSubmission {
    type Output = ();

    fn label(&self) -> &str {
        self.request.function_name()
    }

    async fn execute(&self, ledger: &dyn Ledger) -> Result<(), SubmissionError> {
        let receipt = ledger.call(&self.request).await?;
        if !receipt.is_success() {
            return Err(SubmissionError::reverted(&receipt));
        }
        Ok(())
    }

    fn reconstruct(&self, receipt: &Receipt) -> Option<()> {
        // Receipts without a target are accepted; a different target is not ours.
        match receipt.to {
            Some(to) if to != self.request.target => None,
            _ => Some(()),
        }
    }
}
