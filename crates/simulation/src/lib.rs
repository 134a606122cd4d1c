//! Deterministic in-memory collaborators.
//!
//! Every collaborator trait from `provisioner-core` has an implementation
//! here whose behavior is fully scripted by the test:
//!
//! - [`SimulatedLedger`]: nonce-derived addresses, inclusion delay, and per-call
//!   [`Fault`] injection (lost acknowledgements, reverts, never-included broadcasts)
//! - [`SimulatedFactory`]: placeholder bytecode, optionally missing artifacts
//! - [`RecordingVerifier`]: scripted verification outcomes
//! - [`SimulatedChildChainCreator`]: fixed child-chain creation result

pub mod fixtures;

mod child_chain;
mod factory;
mod ledger;
mod verifier;

pub use child_chain::{SimulatedChildChainCreator, SIMULATED_CHAIN_ID};
pub use factory::SimulatedFactory;
pub use ledger::{CreatedResource, Fault, SimulatedLedger};
pub use verifier::RecordingVerifier;
