//! In-memory ledger with deterministic addresses and injectable faults.

use async_trait::async_trait;
use parking_lot::Mutex;
use provisioner_core::{Ledger, LedgerError, SubmissionError};
use provisioner_types::{
    Address, ArgValue, CallRequest, CreationRequest, Receipt, ReceiptStatus, TxHash,
};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// A fault applied to the next submission with a given label.
///
/// Creation faults are keyed by resource name, call faults by function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Included successfully, but the client reports a timeout carrying the hash.
    DropAcknowledgement,
    /// Included with a failure status, and the client reports a timeout carrying the hash.
    DropAcknowledgementAndRevert,
    /// Broadcast but never included; the client reports a timeout carrying the hash.
    DropAcknowledgementUnconfirmed,
    /// Rejected by the node before broadcast. No hash.
    RejectBeforeBroadcast,
    /// Included with a failure status and acknowledged cleanly.
    Revert,
}

/// A successfully created resource as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedResource {
    pub resource: String,
    pub address: Address,
    pub args: Vec<ArgValue>,
}

struct SimTransaction {
    receipt: Receipt,
    included: bool,
    queries: u32,
}

#[derive(Default)]
struct State {
    faults: HashMap<String, VecDeque<Fault>>,
    transactions: HashMap<TxHash, SimTransaction>,
    next_tx: u64,
    block: u64,
    nonce: u64,
    created: Vec<CreatedResource>,
    creation_attempts: Vec<String>,
    calls: Vec<CallRequest>,
    getter_maps: HashMap<String, Vec<String>>,
    storage: HashMap<(Address, String), Address>,
    overrides: HashMap<(Address, String), Address>,
    receipt_queries: usize,
    failing_receipt_queries: u32,
    remote_calls: usize,
    last_error: Option<SubmissionError>,
}

impl State {
    fn next_tx_hash(&mut self) -> TxHash {
        self.next_tx += 1;
        let mut bytes = [0u8; 32];
        bytes[0] = 0x7a;
        bytes[24..].copy_from_slice(&self.next_tx.to_be_bytes());
        TxHash::new(bytes)
    }

    /// Next creation address, derived from the account nonce.
    fn next_address(&mut self) -> Address {
        self.nonce += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..].copy_from_slice(&self.nonce.to_be_bytes());
        Address::new(bytes)
    }

    fn take_fault(&mut self, label: &str) -> Option<Fault> {
        self.faults.get_mut(label).and_then(VecDeque::pop_front)
    }

    fn record_error(&mut self, error: SubmissionError) -> SubmissionError {
        self.last_error = Some(error.clone());
        error
    }

    /// Include a transaction and return its receipt, or the client error the
    /// fault dictates.
    fn settle(
        &mut self,
        fault: Option<Fault>,
        contract_address: Option<Address>,
        to: Option<Address>,
    ) -> Result<Receipt, SubmissionError> {
        if fault == Some(Fault::RejectBeforeBroadcast) {
            let error = SubmissionError::rejected("nonce too low: transaction rejected by node");
            return Err(self.record_error(error));
        }

        let tx_hash = self.next_tx_hash();
        self.block += 1;
        let status = match fault {
            Some(Fault::Revert | Fault::DropAcknowledgementAndRevert) => ReceiptStatus::Failure,
            _ => ReceiptStatus::Success,
        };
        let receipt = Receipt {
            tx_hash,
            status,
            block_number: self.block,
            contract_address: contract_address.filter(|_| status == ReceiptStatus::Success),
            to,
        };
        let included = fault != Some(Fault::DropAcknowledgementUnconfirmed);
        self.transactions.insert(
            tx_hash,
            SimTransaction {
                receipt: receipt.clone(),
                included,
                queries: 0,
            },
        );

        match fault {
            Some(
                Fault::DropAcknowledgement
                | Fault::DropAcknowledgementAndRevert
                | Fault::DropAcknowledgementUnconfirmed,
            ) => {
                let error = SubmissionError::unacknowledged(
                    tx_hash,
                    format!("timeout exceeded waiting for receipt of {}", tx_hash),
                );
                Err(self.record_error(error))
            }
            _ => Ok(receipt),
        }
    }
}

/// Deterministic ledger for tests.
///
/// Creation addresses are derived from a single account nonce, so two fresh
/// ledgers given the same sequence of successful broadcasts assign the same
/// addresses.
#[derive(Default)]
pub struct SimulatedLedger {
    state: Mutex<State>,
    inclusion_delay: u32,
    host_platform: bool,
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receipts become visible only after this many queries per transaction.
    pub fn with_inclusion_delay(mut self, polls: u32) -> Self {
        self.inclusion_delay = polls;
        self
    }

    /// The first `count` receipt queries fail with a transport error.
    pub fn with_failing_receipt_queries(self, count: u32) -> Self {
        self.state.lock().failing_receipt_queries = count;
        self
    }

    /// Report the ledger as the host platform.
    pub fn with_host_platform(mut self, host: bool) -> Self {
        self.host_platform = host;
        self
    }

    /// Queue a fault for the next submission labelled `label`.
    pub fn inject(&self, label: &str, fault: Fault) {
        self.state
            .lock()
            .faults
            .entry(label.to_string())
            .or_default()
            .push_back(fault);
    }

    /// Store the address arguments of successful `function` calls under `getters`,
    /// positionally, so [`Ledger::read_address`] can read them back.
    pub fn map_call_to_getters<I, S>(&self, function: &str, getters: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().getter_maps.insert(
            function.to_string(),
            getters.into_iter().map(Into::into).collect(),
        );
    }

    /// Force a getter to return `address` regardless of configuration.
    pub fn override_slot(&self, target: Address, getter: &str, address: Address) {
        self.state
            .lock()
            .overrides
            .insert((target, getter.to_string()), address);
    }

    /// Record a plain transaction with the given status.
    pub fn broadcast_transfer(&self, status: ReceiptStatus) -> TxHash {
        let mut state = self.state.lock();
        let tx_hash = state.next_tx_hash();
        state.block += 1;
        let receipt = Receipt {
            tx_hash,
            status,
            block_number: state.block,
            contract_address: None,
            to: Some(Address::ZERO),
        };
        state.transactions.insert(
            tx_hash,
            SimTransaction {
                receipt,
                included: true,
                queries: 0,
            },
        );
        tx_hash
    }

    /// Address the ledger assigned to `resource`, if it was created.
    pub fn address_of(&self, resource: &str) -> Option<Address> {
        self.state
            .lock()
            .created
            .iter()
            .find(|c| c.resource == resource)
            .map(|c| c.address)
    }

    /// Constructor arguments `resource` was created with.
    pub fn creation_args(&self, resource: &str) -> Option<Vec<ArgValue>> {
        self.state
            .lock()
            .created
            .iter()
            .find(|c| c.resource == resource)
            .map(|c| c.args.clone())
    }

    /// Every successfully created resource, in creation order.
    pub fn created(&self) -> Vec<CreatedResource> {
        self.state.lock().created.clone()
    }

    /// Number of creation calls submitted for `resource`.
    pub fn creation_attempts(&self, resource: &str) -> usize {
        self.state
            .lock()
            .creation_attempts
            .iter()
            .filter(|r| r.as_str() == resource)
            .count()
    }

    pub fn total_creation_attempts(&self) -> usize {
        self.state.lock().creation_attempts.len()
    }

    /// Resource names in the order their creation was submitted.
    pub fn creation_order(&self) -> Vec<String> {
        self.state.lock().creation_attempts.clone()
    }

    /// Configuration calls submitted, in order.
    pub fn calls(&self) -> Vec<CallRequest> {
        self.state.lock().calls.clone()
    }

    pub fn receipt_queries(&self) -> usize {
        self.state.lock().receipt_queries
    }

    /// Every ledger interaction of any kind.
    pub fn remote_calls(&self) -> usize {
        self.state.lock().remote_calls
    }

    /// The most recent client-side error handed to a caller.
    pub fn last_submission_error(&self) -> Option<SubmissionError> {
        self.state.lock().last_error.clone()
    }
}

#[async_trait]
impl Ledger for SimulatedLedger {
    async fn create(&self, request: &CreationRequest) -> Result<Receipt, SubmissionError> {
        let mut state = self.state.lock();
        state.remote_calls += 1;
        state.creation_attempts.push(request.resource.clone());
        let fault = state.take_fault(&request.resource);

        let address = match fault {
            Some(Fault::RejectBeforeBroadcast) => None,
            _ => Some(state.next_address()),
        };
        let result = state.settle(fault, address, None);

        let landed = matches!(fault, None | Some(Fault::DropAcknowledgement));
        if let (true, Some(address)) = (landed, address) {
            state.created.push(CreatedResource {
                resource: request.resource.clone(),
                address,
                args: request.args.clone(),
            });
        }

        debug!(resource = %request.resource, ?fault, ?address, "Simulated creation");
        result
    }

    async fn call(&self, request: &CallRequest) -> Result<Receipt, SubmissionError> {
        let mut state = self.state.lock();
        state.remote_calls += 1;
        let function = request.function_name().to_string();
        let fault = state.take_fault(&function);
        if fault != Some(Fault::RejectBeforeBroadcast) {
            state.calls.push(request.clone());
        }

        let result = state.settle(fault, None, Some(request.target));

        if matches!(fault, None | Some(Fault::DropAcknowledgement)) {
            if let Some(getters) = state.getter_maps.get(&function).cloned() {
                for (getter, arg) in getters.iter().zip(&request.args) {
                    if let ArgValue::Address(addr) = arg {
                        state.storage.insert((request.target, getter.clone()), *addr);
                    }
                }
            }
        }

        debug!(function = %function, ?fault, "Simulated call");
        result
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
        let mut state = self.state.lock();
        state.remote_calls += 1;
        state.receipt_queries += 1;

        if state.failing_receipt_queries > 0 {
            state.failing_receipt_queries -= 1;
            return Err(LedgerError::Transport("connection reset".to_string()));
        }

        let delay = self.inclusion_delay;
        Ok(state.transactions.get_mut(&tx_hash).and_then(|tx| {
            if !tx.included {
                return None;
            }
            tx.queries += 1;
            (tx.queries > delay).then(|| tx.receipt.clone())
        }))
    }

    async fn is_host_platform(&self) -> Result<bool, LedgerError> {
        self.state.lock().remote_calls += 1;
        Ok(self.host_platform)
    }

    async fn read_address(&self, target: Address, getter: &str) -> Result<Address, LedgerError> {
        let mut state = self.state.lock();
        state.remote_calls += 1;
        let key = (target, getter.to_string());
        // Unset storage reads as zero.
        Ok(state
            .overrides
            .get(&key)
            .or_else(|| state.storage.get(&key))
            .copied()
            .unwrap_or(Address::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_addresses_follow_nonce() {
        let a = SimulatedLedger::new();
        let b = SimulatedLedger::new();
        b.inject("Bridge", Fault::DropAcknowledgement);

        let ra = a.create(&fixtures::creation_request("Bridge")).await.unwrap();
        let eb = b
            .create(&fixtures::creation_request("Bridge"))
            .await
            .unwrap_err();

        let tx = eb.tx_hash().unwrap();
        let rb = b.transaction_receipt(tx).await.unwrap().unwrap();
        assert_eq!(ra.contract_address, rb.contract_address);
        assert_eq!(b.address_of("Bridge"), rb.contract_address);
    }

    #[tokio::test]
    async fn test_unconfirmed_transaction_is_never_visible() {
        let ledger = SimulatedLedger::new();
        ledger.inject("Bridge", Fault::DropAcknowledgementUnconfirmed);

        let err = ledger
            .create(&fixtures::creation_request("Bridge"))
            .await
            .unwrap_err();
        let tx = err.tx_hash().unwrap();

        assert_eq!(ledger.transaction_receipt(tx).await.unwrap(), None);
        assert_eq!(ledger.address_of("Bridge"), None);
    }

    #[tokio::test]
    async fn test_getter_map_records_call_arguments() {
        let ledger = SimulatedLedger::new();
        ledger.map_call_to_getters("setPair", ["left", "right"]);
        let target = Address::new([1; 20]);
        let left = Address::new([2; 20]);
        let right = Address::new([3; 20]);

        let mut request = fixtures::call_request(target, "setPair(address,address)");
        request.args = vec![left.into(), right.into()];
        ledger.call(&request).await.unwrap();

        assert_eq!(ledger.read_address(target, "left").await.unwrap(), left);
        assert_eq!(ledger.read_address(target, "right").await.unwrap(), right);
        assert_eq!(ledger.read_address(target, "other").await.unwrap(), Address::ZERO);
    }
}
