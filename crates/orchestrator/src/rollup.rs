//! The fixed rollup resource graph and its template wiring.
//!
//! ```text
//!  EthBridge ─┐                             ┌─ Erc20Bridge
//!  EthSequencerInbox ─┤                     ├─ Erc20SequencerInbox
//!  EthInbox ──────────┼──► BridgeCreator ◄──┼─ Erc20Inbox
//!  EthRollupEventInbox┤                     ├─ Erc20RollupEventInbox
//!  EthOutbox ─┘                             └─ Erc20Outbox
//!
//!  OneStepProver0, OneStepProverMemory,
//!  OneStepProverMath, OneStepProverHostIo ──► OneStepProofEntry
//!
//!  ChallengeManager, RollupAdminLogic, RollupUserLogic, UpgradeExecutor,
//!  ValidatorUtils, ValidatorWalletCreator, RollupCreator, DeployHelper
//!
//!  RollupCreator.setTemplates(BridgeCreator, OneStepProofEntry, ...)
//! ```
//!
//! Both sequencer inboxes take the blob reader address. On the host platform
//! the reader is built in and the zero address is passed; elsewhere a
//! `Reader4844` resource is deployed first.

use crate::{GraphError, ResourceGraph};
use provisioner_types::{Address, ArgSpec, CodeTemplate, ResourceSpec};

/// Resource that receives the configuration call.
pub const ROLLUP_CREATOR: &str = "RollupCreator";

/// Blob reader deployed off the host platform.
pub const READER_4844: &str = "Reader4844";

/// Signature of the configuration call.
pub const SET_TEMPLATES: &str =
    "setTemplates(address,address,address,address,address,address,address,address,address)";

/// Native-asset bridge set, in `BridgeCreator` struct order.
pub const ETH_BRIDGE_SET: [&str; 5] = [
    "EthBridge",
    "EthSequencerInbox",
    "EthInbox",
    "EthRollupEventInbox",
    "EthOutbox",
];

/// Custom-fee-token bridge set, in `BridgeCreator` struct order.
pub const ERC20_BRIDGE_SET: [&str; 5] = [
    "Erc20Bridge",
    "Erc20SequencerInbox",
    "Erc20Inbox",
    "Erc20RollupEventInbox",
    "Erc20Outbox",
];

/// One positional slot of the configuration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSlot {
    /// Resource whose address fills the slot.
    pub resource: &'static str,
    /// Getter on the rollup creator that reads the slot back.
    pub getter: &'static str,
}

/// `setTemplates` slots, in declared positional order.
pub const TEMPLATE_SLOTS: [TemplateSlot; 9] = [
    TemplateSlot { resource: "BridgeCreator", getter: "bridgeCreator" },
    TemplateSlot { resource: "OneStepProofEntry", getter: "osp" },
    TemplateSlot { resource: "ChallengeManager", getter: "challengeManagerTemplate" },
    TemplateSlot { resource: "RollupAdminLogic", getter: "rollupAdminLogic" },
    TemplateSlot { resource: "RollupUserLogic", getter: "rollupUserLogic" },
    TemplateSlot { resource: "UpgradeExecutor", getter: "upgradeExecutorLogic" },
    TemplateSlot { resource: "ValidatorUtils", getter: "validatorUtils" },
    TemplateSlot { resource: "ValidatorWalletCreator", getter: "validatorWalletCreator" },
    TemplateSlot { resource: "DeployHelper", getter: "l2FactoriesDeployer" },
];

/// The single configuration call that wires created resources together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationPlan {
    /// Resource that is called.
    pub target: String,
    /// Function signature.
    pub signature: String,
    /// `(resource, getter)` per positional argument.
    pub slots: Vec<(String, String)>,
}

impl ConfigurationPlan {
    /// Every resource the plan needs a handle for, target included.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.target.as_str()).chain(self.slots.iter().map(|(r, _)| r.as_str()))
    }
}

/// `RollupCreator.setTemplates(...)`.
pub fn rollup_configuration() -> ConfigurationPlan {
    ConfigurationPlan {
        target: ROLLUP_CREATOR.to_string(),
        signature: SET_TEMPLATES.to_string(),
        slots: TEMPLATE_SLOTS
            .iter()
            .map(|s| (s.resource.to_string(), s.getter.to_string()))
            .collect(),
    }
}

fn named(name: &str, contract: &str) -> ResourceSpec {
    ResourceSpec::new(name, CodeTemplate::artifact(contract))
}

/// Build the rollup graph.
///
/// `host_platform` selects whether a blob reader is deployed.
pub fn rollup_graph(max_data_size: u64, host_platform: bool) -> Result<ResourceGraph, GraphError> {
    let mut specs = Vec::with_capacity(26);

    let reader = if host_platform {
        ArgSpec::from(Address::ZERO)
    } else {
        specs.push(ResourceSpec::artifact(READER_4844).unverified());
        ArgSpec::address_of(READER_4844)
    };

    specs.extend([
        named("EthBridge", "Bridge"),
        named("EthSequencerInbox", "SequencerInbox").with_args(vec![
            max_data_size.into(),
            reader.clone(),
            false.into(),
        ]),
        named("EthInbox", "Inbox").with_args(vec![max_data_size.into()]),
        named("EthRollupEventInbox", "RollupEventInbox"),
        named("EthOutbox", "Outbox"),
        named("Erc20Bridge", "ERC20Bridge"),
        named("Erc20SequencerInbox", "SequencerInbox").with_args(vec![
            max_data_size.into(),
            reader,
            true.into(),
        ]),
        named("Erc20Inbox", "ERC20Inbox").with_args(vec![max_data_size.into()]),
        named("Erc20RollupEventInbox", "ERC20RollupEventInbox"),
        named("Erc20Outbox", "ERC20Outbox"),
        ResourceSpec::artifact("BridgeCreator").with_args(vec![
            ArgSpec::addresses_of(ETH_BRIDGE_SET),
            ArgSpec::addresses_of(ERC20_BRIDGE_SET),
        ]),
        ResourceSpec::artifact("OneStepProver0"),
        ResourceSpec::artifact("OneStepProverMemory"),
        ResourceSpec::artifact("OneStepProverMath"),
        ResourceSpec::artifact("OneStepProverHostIo"),
        ResourceSpec::artifact("OneStepProofEntry").with_args(vec![
            ArgSpec::address_of("OneStepProver0"),
            ArgSpec::address_of("OneStepProverMemory"),
            ArgSpec::address_of("OneStepProverMath"),
            ArgSpec::address_of("OneStepProverHostIo"),
        ]),
        ResourceSpec::artifact("ChallengeManager"),
        ResourceSpec::artifact("RollupAdminLogic"),
        ResourceSpec::artifact("RollupUserLogic"),
        ResourceSpec::artifact("UpgradeExecutor").with_source_path(
            "node_modules/@offchainlabs/upgrade-executor/src/UpgradeExecutor.sol:UpgradeExecutor",
        ),
        ResourceSpec::artifact("ValidatorUtils"),
        ResourceSpec::artifact("ValidatorWalletCreator"),
        ResourceSpec::artifact(ROLLUP_CREATOR),
        ResourceSpec::artifact("DeployHelper"),
    ]);

    ResourceGraph::from_specs(specs)
}
