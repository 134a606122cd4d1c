//! Bootstrap driver: parameters, provisioning, child chain, manifests.
//!
//! [`run_bootstrap`] is the entry point. It validates parameters before any
//! collaborator is built, so a missing parameter never reaches the ledger.
//! All I/O collaborators are injected through [`Collaborators`]; the caller
//! decides whether they talk to a real ledger or to the simulation.

use crate::{
    write_manifests, BootstrapError, BootstrapParams, ManifestPaths, ProvisionConfig,
    ProvisionError, ProvisionParams, Provisioned, ProvisioningOrchestrator, ROLLUP_CREATOR,
};
use provisioner_core::{
    ChildChain, ChildChainCreator, ChildChainRequest, ContractFactory, Ledger, Verifier,
};
use provisioner_deployer::{AwaiterConfig, ResourceDeployer};
use provisioner_types::{Address, Signer};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// External collaborators of a run.
pub struct Collaborators {
    pub ledger: Arc<dyn Ledger>,
    pub factory: Arc<dyn ContractFactory>,
    /// Source verification; `None` disables it regardless of parameters.
    pub verifier: Option<Arc<dyn Verifier>>,
    pub child_chain: Arc<dyn ChildChainCreator>,
    pub signer: Signer,
}

/// Tunables that do not come from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub awaiter: AwaiterConfig,
    pub provision: ProvisionConfig,
}

impl RunOptions {
    pub fn with_awaiter(mut self, awaiter: AwaiterConfig) -> Self {
        self.awaiter = awaiter;
        self
    }

    pub fn with_provision(mut self, provision: ProvisionConfig) -> Self {
        self.provision = provision;
        self
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    /// Configured rollup creator handed to child-chain creation.
    pub rollup_creator: Address,
    pub provisioned: Provisioned,
    pub chain: ChildChain,
    pub manifests: ManifestPaths,
}

/// One bootstrap run with validated parameters and built collaborators.
pub struct Bootstrap {
    params: BootstrapParams,
    collaborators: Collaborators,
    options: RunOptions,
}

impl Bootstrap {
    pub fn new(params: BootstrapParams, collaborators: Collaborators) -> Self {
        Self {
            params,
            collaborators,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Provision, create the child chain, write manifests.
    pub async fn run(self) -> Result<BootstrapReport, BootstrapError> {
        let Self {
            params,
            collaborators,
            options,
        } = self;

        let verify = params.verify && collaborators.verifier.is_some();
        let mut deployer = ResourceDeployer::new(
            collaborators.ledger.clone(),
            collaborators.factory.clone(),
            options.awaiter,
        );
        if let Some(verifier) = collaborators.verifier.clone() {
            deployer = deployer.with_verifier(verifier);
        }
        let orchestrator = ProvisioningOrchestrator::new(deployer).with_config(options.provision);

        info!(
            chain = %params.chain_name,
            parent_chain_id = params.parent_chain_id,
            account = %collaborators.signer.account(),
            verify,
            "Starting bootstrap"
        );

        let provisioned = orchestrator
            .provision_all(
                &collaborators.signer,
                ProvisionParams {
                    max_data_size: params.max_data_size,
                    verify,
                },
            )
            .await?;
        let rollup_creator = provisioned
            .result
            .address_of(ROLLUP_CREATOR)
            .ok_or_else(|| ProvisionError::Incomplete(ROLLUP_CREATOR.to_string()))?;

        let chain = collaborators
            .child_chain
            .create_child_chain(&ChildChainRequest {
                signer: collaborators.signer.clone(),
                dev_deployment: params.dev_deployment,
                rollup_creator,
                fee_token: params.fee_token,
            })
            .await?;
        info!(
            rollup_creator = %rollup_creator,
            result = %chain.rollup_creation_result,
            "Child chain created"
        );

        if let Err(source) = write_manifests(&params.manifests, &chain, &params.chain_name) {
            return Err(BootstrapError::Manifest {
                rollup_creator,
                chain: Box::new(chain),
                source,
            });
        }

        Ok(BootstrapReport {
            rollup_creator,
            provisioned,
            chain,
            manifests: params.manifests,
        })
    }
}

/// Validate parameters, build collaborators with `connect`, and run.
///
/// `connect` is only called once parameters are valid.
pub async fn run_bootstrap<L, C, Fut>(
    lookup: L,
    options: RunOptions,
    connect: C,
) -> Result<BootstrapReport, BootstrapError>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(BootstrapParams) -> Fut,
    Fut: Future<Output = Result<Collaborators, BootstrapError>>,
{
    let params = BootstrapParams::from_lookup(lookup)?;
    let collaborators = connect(params.clone()).await?;
    Bootstrap::new(params, collaborators)
        .with_options(options)
        .run()
        .await
}

/// Process exit code for the outcome of a run.
pub fn exit_code<T>(result: &Result<T, BootstrapError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(err) => err.exit_code(),
    }
}
