//! Building production collaborators from validated parameters.

use crate::{
    ArtifactStore, CastLedger, CommandChildChainCreator, ForgeVerifier, RpcClient, Toolchain,
};
use anyhow::{ensure, Context};
use provisioner_core::Verifier;
use provisioner_orchestrator::{BootstrapError, BootstrapParams, Collaborators};
use provisioner_types::Signer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Settings for the production adapters that do not come from the
/// bootstrap parameters.
#[derive(Debug, Clone)]
pub struct ProductionOptions {
    /// Directory holding compiled artifacts.
    pub artifacts_dir: PathBuf,
    pub toolchain: Toolchain,
    /// Program that performs child-chain creation, plus its arguments.
    pub child_chain_command: Vec<String>,
    /// Per-request JSON-RPC timeout.
    pub request_timeout: Duration,
    /// How long a broadcast may go unacknowledged.
    pub ack_timeout: Duration,
    pub verify_timeout: Duration,
    /// Extra flags for `forge verify-contract`.
    pub verifier_args: Vec<String>,
}

/// Connect to the parent chain and build every collaborator.
pub async fn connect(
    params: &BootstrapParams,
    options: &ProductionOptions,
) -> Result<Collaborators, BootstrapError> {
    build(params, options)
        .await
        .map_err(|e| BootstrapError::Setup(format!("{e:#}")))
}

async fn build(
    params: &BootstrapParams,
    options: &ProductionOptions,
) -> anyhow::Result<Collaborators> {
    let rpc = Arc::new(
        RpcClient::new(params.parent_chain_rpc.clone(), options.request_timeout)
            .context("building RPC client")?,
    );

    let chain_id = rpc
        .chain_id()
        .await
        .with_context(|| format!("querying chain id from {}", params.parent_chain_rpc))?;
    ensure!(
        chain_id == params.parent_chain_id,
        "PARENT_CHAIN_ID is {} but {} reports chain id {}",
        params.parent_chain_id,
        params.parent_chain_rpc,
        chain_id
    );

    let ledger = CastLedger::new(rpc.clone(), options.toolchain.clone())
        .with_ack_timeout(options.ack_timeout);
    let account = ledger
        .signer_address(&params.private_key)
        .await
        .context("deriving deployer address")?;
    info!(chain_id, account = %account, "Connected to parent chain");

    let (program, args) = options
        .child_chain_command
        .split_first()
        .context("no child-chain command configured")?;
    let child_chain =
        CommandChildChainCreator::new(program, params.parent_chain_rpc.clone(), chain_id)
            .with_args(args.to_vec());

    let verifier: Option<Arc<dyn Verifier>> = params.verify.then(|| {
        Arc::new(
            ForgeVerifier::new(options.toolchain.clone(), params.parent_chain_rpc.clone())
                .with_extra_args(options.verifier_args.clone())
                .with_timeout(options.verify_timeout),
        ) as Arc<dyn Verifier>
    });

    Ok(Collaborators {
        ledger: Arc::new(ledger),
        factory: Arc::new(ArtifactStore::new(options.artifacts_dir.clone())),
        verifier,
        child_chain: Arc::new(child_chain),
        signer: Signer::new(account, params.private_key.clone()),
    })
}
