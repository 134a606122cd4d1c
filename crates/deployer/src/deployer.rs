//! Resource deployer.

use crate::{
    verify_best_effort, AwaiterConfig, CreateSubmission, DeployError, IdempotentSubmitter,
    TransactionAwaiter,
};
use provisioner_core::{
    ContractFactory, Ledger, VerificationOutcome, VerificationRequest, Verifier,
};
use provisioner_types::{ArgValue, CreationRequest, ResourceHandle, ResourceSpec, Signer, TxHash};
use std::sync::Arc;
use tracing::info;

/// Result of deploying one resource.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Handle to the created resource.
    pub handle: ResourceHandle,
    /// Set when the address came from reconciling a lost acknowledgement.
    pub recovered_from: Option<TxHash>,
    /// Verification result, when verification was requested and attempted.
    pub verification: Option<VerificationOutcome>,
}

/// Creates resources one at a time through the [`IdempotentSubmitter`].
pub struct ResourceDeployer {
    submitter: IdempotentSubmitter,
    factory: Arc<dyn ContractFactory>,
    verifier: Option<Arc<dyn Verifier>>,
}

impl ResourceDeployer {
    /// Create a deployer without a verification service.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        factory: Arc<dyn ContractFactory>,
        config: AwaiterConfig,
    ) -> Self {
        let awaiter = TransactionAwaiter::new(ledger.clone(), config);
        Self {
            submitter: IdempotentSubmitter::new(ledger, awaiter),
            factory,
            verifier: None,
        }
    }

    /// Attach a verification service.
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// The submitter, shared with the configuration step.
    pub fn submitter(&self) -> &IdempotentSubmitter {
        &self.submitter
    }

    /// Deploy `spec` with already-resolved constructor arguments.
    ///
    /// Verification runs only when `verify` is set, the spec allows it and a
    /// verifier is attached. Its outcome never affects the returned handle.
    pub async fn deploy(
        &self,
        spec: &ResourceSpec,
        args: Vec<ArgValue>,
        signer: &Signer,
        verify: bool,
    ) -> Result<Deployment, DeployError> {
        let code = self
            .factory
            .creation_code(spec.name(), spec.template())
            .map_err(|source| DeployError::Backend {
                resource: spec.name().to_string(),
                source,
            })?;

        let submission = CreateSubmission::new(CreationRequest {
            resource: spec.name().to_string(),
            contract: code.contract.clone(),
            bytecode: code.bytecode,
            constructor: code.constructor.clone(),
            args: args.clone(),
            signer: signer.clone(),
        });

        let submitted = self
            .submitter
            .submit(&submission)
            .await
            .map_err(|source| DeployError::Submission {
                resource: spec.name().to_string(),
                source,
            })?;

        let handle = ResourceHandle::new(spec.name(), submitted.value, signer.clone());
        info!(
            resource = spec.name(),
            address = %handle.address(),
            recovered = submitted.recovered_from.is_some(),
            "Deployed resource"
        );

        let verification = match &self.verifier {
            Some(verifier) if verify && spec.is_verifiable() => {
                let request = VerificationRequest {
                    contract: code.contract,
                    address: handle.address(),
                    constructor: code.constructor,
                    constructor_args: args,
                    source_path: spec.source_path().map(str::to_string),
                };
                Some(verify_best_effort(verifier.as_ref(), &request).await)
            }
            _ => None,
        };

        Ok(Deployment {
            handle,
            recovered_from: submitted.recovered_from,
            verification,
        })
    }
}
