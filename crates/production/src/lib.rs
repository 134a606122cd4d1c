//! Production adapters for rollup provisioning.
//!
//! - [`RpcClient`]: JSON-RPC reads (receipts, `eth_call`, chain id)
//! - [`CastLedger`]: signs and broadcasts with Foundry `cast`
//! - [`ArtifactStore`]: compiled contract artifacts
//! - [`ForgeVerifier`]: `forge verify-contract`
//! - [`CommandChildChainCreator`]: child-chain creation program
//! - [`connect`]: builds all of the above for a bootstrap run

pub mod abi;
mod artifacts;
mod cast;
mod child_chain;
mod connect;
mod rpc;
mod toolchain;
mod verify;

pub use artifacts::ArtifactStore;
pub use cast::{call_args, creation_args, CastLedger, DEFAULT_ACK_TIMEOUT};
pub use child_chain::{parse_child_chain, CommandChildChainCreator};
pub use connect::{connect, ProductionOptions};
pub use rpc::{RpcClient, ARB_SYS};
pub use toolchain::{ToolOutput, Toolchain, PRIVATE_KEY_ENV};
pub use verify::{classify, ForgeVerifier, DEFAULT_VERIFY_TIMEOUT};
