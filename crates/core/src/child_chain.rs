//! Input and output of the child-chain creation workflow.

use provisioner_types::{Address, Signer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters handed to the child-chain creation collaborator.
#[derive(Debug, Clone)]
pub struct ChildChainRequest {
    /// Account paying for creation.
    pub signer: Signer,
    /// Whether this is a development deployment.
    pub dev_deployment: bool,
    /// Address of the configured rollup creator aggregator.
    pub rollup_creator: Address,
    /// Fee token, or [`Address::ZERO`] for the native asset.
    pub fee_token: Address,
}

/// Structured result of child-chain creation.
///
/// The creation result is persisted verbatim; only the chain info is
/// augmented before it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildChain {
    /// Raw creation result (created addresses, deployment block, ...).
    pub rollup_creation_result: Value,
    /// Derived chain metadata.
    pub chain_info: Map<String, Value>,
}
