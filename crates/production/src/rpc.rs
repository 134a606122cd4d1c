//! JSON-RPC client for read-only ledger queries.

use crate::abi::{decode_address, encode_call, getter_signature, parse_quantity};
use provisioner_core::LedgerError;
use provisioner_types::{Address, Receipt, ReceiptStatus, TxHash};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// ArbSys precompile, present only on the host platform.
pub const ARB_SYS: Address = Address::new([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x64,
]);

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    status: Option<String>,
    block_number: String,
    contract_address: Option<Address>,
    to: Option<Address>,
}

impl RpcReceipt {
    fn into_receipt(self) -> Result<Receipt, LedgerError> {
        let status = match self.status.as_deref().map(parse_quantity).transpose()? {
            Some(1) => ReceiptStatus::Success,
            Some(_) => ReceiptStatus::Failure,
            None => return Err(LedgerError::Decode("receipt has no status field".to_string())),
        };
        Ok(Receipt {
            tx_hash: self.transaction_hash,
            status,
            block_number: parse_quantity(&self.block_number)?,
            contract_address: self.contract_address,
            to: self.to,
        })
    }
}

/// HTTP JSON-RPC 2.0 client.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a request. `Ok(None)` is a `null` result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method, id, "RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        match parsed.error {
            Some(err) => Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(parsed.result),
        }
    }

    pub async fn chain_id(&self) -> Result<u64, LedgerError> {
        let raw: String = self
            .request("eth_chainId", json!([]))
            .await?
            .ok_or_else(|| LedgerError::Decode("eth_chainId returned null".to_string()))?;
        parse_quantity(&raw)
    }

    /// Fetch a receipt. `Ok(None)` until the transaction is included.
    pub async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
        let receipt: Option<RpcReceipt> = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        receipt.map(RpcReceipt::into_receipt).transpose()
    }

    /// `eth_call` against the latest block. Returns the raw result data.
    pub async fn call(&self, to: Address, data: &str) -> Result<String, LedgerError> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?
            .ok_or_else(|| LedgerError::Decode("eth_call returned null".to_string()))
    }

    /// Call an argument-less getter returning an address.
    pub async fn read_address(&self, target: Address, getter: &str) -> Result<Address, LedgerError> {
        let data = self.call(target, &encode_call(&getter_signature(getter))).await?;
        decode_address(&data)
    }

    /// Whether the node runs on the host platform.
    ///
    /// Asks the ArbSys precompile for its version. Elsewhere the address has
    /// no code, so the call either returns empty data or is rejected.
    pub async fn is_host_platform(&self) -> Result<bool, LedgerError> {
        match self.call(ARB_SYS, &encode_call("arbOSVersion()")).await {
            Ok(data) => Ok(data.trim_start_matches("0x").len() >= 64),
            Err(LedgerError::Rpc { code, message }) => {
                debug!(code, message = %message, "ArbSys probe rejected");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }
}
