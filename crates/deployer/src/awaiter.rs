//! Transaction awaiter.

use crate::AwaiterConfig;
use provisioner_core::Ledger;
use provisioner_types::{TransactionOutcome, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, warn};

/// Waits for a transaction to reach a terminal state.
///
/// Query errors are treated as "not yet observed": the awaiter keeps polling
/// until the deadline, so a flaky endpoint degrades to [`TransactionOutcome::TimedOut`]
/// rather than a false revert.
#[derive(Clone)]
pub struct TransactionAwaiter {
    ledger: Arc<dyn Ledger>,
    config: AwaiterConfig,
}

impl TransactionAwaiter {
    /// Create an awaiter over `ledger`.
    pub fn new(ledger: Arc<dyn Ledger>, config: AwaiterConfig) -> Self {
        Self { ledger, config }
    }

    /// Wait using the configured budget.
    pub async fn wait(&self, tx_hash: TxHash) -> TransactionOutcome {
        self.wait_for(tx_hash, self.config.timeout).await
    }

    /// Wait up to `timeout` for `tx_hash` to be included.
    pub async fn wait_for(&self, tx_hash: TxHash, timeout: Duration) -> TransactionOutcome {
        let deadline = Instant::now() + timeout;
        let mut polls = 0u32;

        loop {
            polls += 1;
            match timeout_at(deadline, self.ledger.transaction_receipt(tx_hash)).await {
                Ok(Ok(Some(receipt))) => {
                    let outcome = TransactionOutcome::from_receipt(receipt);
                    debug!(tx = %tx_hash, polls, outcome = outcome.label(), "Transaction resolved");
                    return outcome;
                }
                Ok(Ok(None)) => {
                    debug!(tx = %tx_hash, polls, "Transaction not yet included");
                }
                Ok(Err(e)) => {
                    warn!(tx = %tx_hash, polls, error = %e, "Receipt query failed");
                }
                Err(_) => break,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(self.config.poll_interval.min(deadline - now)).await;
        }

        warn!(tx = %tx_hash, polls, ?timeout, "Gave up waiting for transaction");
        TransactionOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_simulation::SimulatedLedger;
    use provisioner_types::ReceiptStatus;

    fn fast() -> AwaiterConfig {
        AwaiterConfig::default()
            .with_timeout(Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_confirmed_after_a_few_polls() {
        let ledger = Arc::new(SimulatedLedger::new().with_inclusion_delay(3));
        let tx = ledger.broadcast_transfer(ReceiptStatus::Success);
        let awaiter = TransactionAwaiter::new(ledger.clone(), fast());

        let outcome = awaiter.wait(tx).await;
        assert!(matches!(outcome, TransactionOutcome::Confirmed(ref r) if r.tx_hash == tx));
        assert!(ledger.receipt_queries() >= 3);
    }

    #[tokio::test]
    async fn test_failure_status_is_reverted() {
        let ledger = Arc::new(SimulatedLedger::new());
        let tx = ledger.broadcast_transfer(ReceiptStatus::Failure);
        let awaiter = TransactionAwaiter::new(ledger, fast());

        assert!(matches!(
            awaiter.wait(tx).await,
            TransactionOutcome::Reverted(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_transaction_times_out() {
        let ledger = Arc::new(SimulatedLedger::new());
        let awaiter = TransactionAwaiter::new(ledger, fast());

        let outcome = awaiter
            .wait_for(TxHash::new([0x42; 32]), Duration::from_millis(30))
            .await;
        assert_eq!(outcome, TransactionOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_query_errors_keep_polling() {
        let ledger = Arc::new(SimulatedLedger::new().with_failing_receipt_queries(2));
        let tx = ledger.broadcast_transfer(ReceiptStatus::Success);
        let awaiter = TransactionAwaiter::new(ledger.clone(), fast());

        assert!(matches!(
            awaiter.wait(tx).await,
            TransactionOutcome::Confirmed(_)
        ));
        assert_eq!(ledger.receipt_queries(), 3);
    }
}
