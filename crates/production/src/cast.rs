//! Ledger client that signs and broadcasts through `cast`.
//!
//! Signing and nonce management stay inside the Foundry toolchain. Each
//! state-changing call is broadcast with `cast send --async`, which prints
//! the transaction hash as soon as the node accepts it; the receipt is then
//! polled over JSON-RPC for a bounded acknowledgement window.
//!
//! ```text
//! cast send --async ──► tx hash ──► poll receipt ──► Ok(receipt)
//!      │                                 │
//!      └─ fails: no hash (rejected)      └─ window elapses: error carrying tx hash
//! ```

use crate::{RpcClient, Toolchain};
use async_trait::async_trait;
use provisioner_core::{Ledger, LedgerError, SubmissionError};
use provisioner_types::{Address, CallRequest, CreationRequest, PrivateKey, Receipt, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default acknowledgement window for a broadcast transaction.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(60);

/// [`Ledger`] backed by `cast` for writes and [`RpcClient`] for reads.
pub struct CastLedger {
    rpc: Arc<RpcClient>,
    toolchain: Toolchain,
    ack_timeout: Duration,
    poll_interval: Duration,
}

impl CastLedger {
    pub fn new(rpc: Arc<RpcClient>, toolchain: Toolchain) -> Self {
        Self {
            rpc,
            toolchain,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            poll_interval: Duration::from_secs(1),
        }
    }

    /// How long a broadcast may go without a receipt before it is reported
    /// as unacknowledged.
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Account address controlled by `key`.
    pub async fn signer_address(&self, key: &PrivateKey) -> Result<Address, LedgerError> {
        let output = self
            .toolchain
            .cast_signed(key, ["wallet", "address"])
            .await
            .map_err(|e| LedgerError::Toolchain(e.to_string()))?;
        if !output.success {
            return Err(LedgerError::Toolchain(output.diagnostic()));
        }
        output
            .last_line()
            .ok_or_else(|| LedgerError::Decode("cast wallet address printed nothing".to_string()))?
            .parse::<Address>()
            .map_err(|e| LedgerError::Decode(format!("signer address: {e}")))
    }

    /// Broadcast and return the transaction hash. Errors carry no hash.
    async fn broadcast(
        &self,
        key: &PrivateKey,
        args: Vec<String>,
    ) -> Result<TxHash, SubmissionError> {
        let output = self
            .toolchain
            .cast_signed(key, args)
            .await
            .map_err(|e| SubmissionError::rejected(format!("cannot run cast: {e}")))?;
        if !output.success {
            return Err(SubmissionError::rejected(output.diagnostic()));
        }
        let line = output
            .last_line()
            .ok_or_else(|| SubmissionError::rejected("cast send printed no transaction hash"))?;
        line.parse::<TxHash>()
            .map_err(|e| SubmissionError::rejected(format!("unexpected cast output {line:?}: {e}")))
    }

    /// Wait for the broadcast's receipt within the acknowledgement window.
    async fn acknowledge(&self, tx_hash: TxHash) -> Result<Receipt, SubmissionError> {
        let deadline = Instant::now() + self.ack_timeout;
        loop {
            match self.rpc.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => debug!(tx = %tx_hash, error = %e, "Receipt query failed"),
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(SubmissionError::unacknowledged(
                    tx_hash,
                    format!(
                        "no receipt for {tx_hash} within {}s",
                        self.ack_timeout.as_secs()
                    ),
                ));
            }
            sleep(self.poll_interval).await;
        }
    }

    fn send_prefix(&self) -> Vec<String> {
        vec![
            "send".to_string(),
            "--async".to_string(),
            "--rpc-url".to_string(),
            self.rpc.url().to_string(),
        ]
    }
}

/// Arguments for `cast send --create`.
pub fn creation_args(request: &CreationRequest) -> Vec<String> {
    let mut args = vec!["--create".to_string(), request.bytecode.clone()];
    if let Some(constructor) = &request.constructor {
        args.push(constructor.clone());
        args.extend(request.args.iter().map(ToString::to_string));
    }
    args
}

/// Arguments for `cast send <to> <sig> [args]`.
pub fn call_args(request: &CallRequest) -> Vec<String> {
    let mut args = vec![request.target.to_hex(), request.signature.clone()];
    args.extend(request.args.iter().map(ToString::to_string));
    args
}

#[async_trait]
impl Ledger for CastLedger {
    async fn create(&self, request: &CreationRequest) -> Result<Receipt, SubmissionError> {
        let mut args = self.send_prefix();
        args.extend(creation_args(request));
        let tx_hash = self.broadcast(request.signer.key(), args).await?;
        debug!(resource = %request.resource, tx = %tx_hash, "Creation broadcast");
        self.acknowledge(tx_hash).await
    }

    async fn call(&self, request: &CallRequest) -> Result<Receipt, SubmissionError> {
        let mut args = self.send_prefix();
        args.extend(call_args(request));
        let tx_hash = self.broadcast(request.signer.key(), args).await?;
        debug!(function = request.function_name(), tx = %tx_hash, "Call broadcast");
        self.acknowledge(tx_hash).await
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
        self.rpc.transaction_receipt(tx_hash).await
    }

    async fn is_host_platform(&self) -> Result<bool, LedgerError> {
        self.rpc.is_host_platform().await
    }

    async fn read_address(&self, target: Address, getter: &str) -> Result<Address, LedgerError> {
        self.rpc.read_address(target, getter).await
    }
}
