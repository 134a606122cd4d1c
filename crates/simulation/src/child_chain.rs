//! Child-chain creator returning a fixed, well-formed result.

use async_trait::async_trait;
use parking_lot::Mutex;
use provisioner_core::{ChildChain, ChildChainCreator, ChildChainError, ChildChainRequest};
use provisioner_types::Address;
use serde_json::{json, Map, Value};

/// Chain id reported for simulated child chains.
pub const SIMULATED_CHAIN_ID: u64 = 412_346;

/// Simulated child-chain creation.
#[derive(Default)]
pub struct SimulatedChildChainCreator {
    failure: Option<String>,
    requests: Mutex<Vec<(bool, Address, Address)>>,
}

impl SimulatedChildChainCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(dev_deployment, rollup_creator, fee_token)` of each request.
    pub fn requests(&self) -> Vec<(bool, Address, Address)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChildChainCreator for SimulatedChildChainCreator {
    async fn create_child_chain(
        &self,
        request: &ChildChainRequest,
    ) -> Result<ChildChain, ChildChainError> {
        self.requests.lock().push((
            request.dev_deployment,
            request.rollup_creator,
            request.fee_token,
        ));

        if let Some(message) = &self.failure {
            return Err(ChildChainError::Failed(message.clone()));
        }

        let rollup = Address::new([0xe1; 20]);
        let creation = json!({
            "rollup": rollup,
            "inbox": Address::new([0xe2; 20]),
            "bridge": Address::new([0xe3; 20]),
            "sequencer-inbox": Address::new([0xe4; 20]),
            "deployed-at": 42,
            "native-token": request.fee_token,
        });

        let mut chain_info = Map::new();
        chain_info.insert("chain-id".into(), Value::from(SIMULATED_CHAIN_ID));
        chain_info.insert("parent-chain-id".into(), Value::from(1337u64));
        chain_info.insert("rollup".into(), creation.clone());

        Ok(ChildChain {
            rollup_creation_result: creation,
            chain_info,
        })
    }
}
