//! Error types for provisioning and bootstrap.

use provisioner_core::{ChildChain, ChildChainError, LedgerError, SubmissionError};
use crate::ProvisioningReport;
use provisioner_deployer::DeployError;
use provisioner_types::{Address, UnresolvedReference};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid resource graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Resource {0} is declared twice")]
    Duplicate(String),

    #[error("Resource {resource} depends on undeclared resource {dependency}")]
    UnknownDependency {
        /// Declaring resource.
        resource: String,
        /// Missing dependency.
        dependency: String,
    },

    #[error("Dependency cycle among: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Failure of a provisioning run. Any of these aborts the run; no partial
/// result is handed downstream.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The configuration plan names a resource the graph does not declare.
    #[error("Configuration refers to undeclared resource {0}")]
    UnknownSlot(String),

    #[error("Cannot resolve arguments of {resource}: {source}")]
    Unresolved {
        /// Resource whose arguments failed to resolve.
        resource: String,
        #[source]
        source: UnresolvedReference,
    },

    /// A resource could not be deployed.
    #[error(
        "Provisioning aborted with {} resource(s) already created: {source}",
        .report.created().count()
    )]
    Deploy {
        #[source]
        source: DeployError,
        /// State of every resource when the run stopped.
        report: Box<ProvisioningReport>,
    },

    #[error("Resource {0} was created twice")]
    DuplicateHandle(String),

    /// Configuration attempted without a handle for every slot.
    #[error("No handle for {0}; refusing to configure with a partial result")]
    Incomplete(String),

    /// The configuration call failed and could not be recovered.
    #[error("Configuration call failed: {0}")]
    Configuration(#[source] SubmissionError),

    /// A recovered configuration call did not leave the expected state behind.
    #[error("Configuration slot {slot} holds {actual}, expected {expected}")]
    ConfigurationMismatch {
        /// Getter that was read back.
        slot: String,
        /// Address passed to the configuration call.
        expected: Address,
        /// Address read from the ledger.
        actual: Address,
    },
}

/// Missing or malformed run parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("Required parameter {0} is not set")]
    Missing(&'static str),

    #[error("Parameter {key} is invalid: {reason}")]
    Invalid {
        /// Parameter name.
        key: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

/// Failure to persist a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Cannot serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot write manifest {}: {source}", .path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a bootstrap run.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// Collaborators could not be constructed.
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    ChildChain(#[from] ChildChainError),

    /// Manifests could not be written after everything on the ledger succeeded.
    ///
    /// Carries the child-chain result so the manifests can be rebuilt from it.
    #[error(
        "Provisioning succeeded and resources exist on the ledger (RollupCreator at \
         {rollup_creator}), but writing manifests failed: {source}. Re-derive the \
         manifests from the created addresses; do not re-provision. Child chain \
         creation result: {}",
        .chain.rollup_creation_result
    )]
    Manifest {
        /// Configured rollup creator.
        rollup_creator: Address,
        /// Child chain created before the write failed.
        chain: Box<ChildChain>,
        #[source]
        source: ManifestError,
    },
}

impl BootstrapError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::Params(_) => 2,
            _ => 1,
        }
    }
}
