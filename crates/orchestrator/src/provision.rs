//! Provisioning orchestrator.
//!
//! Deploys a [`ResourceGraph`] one resource at a time in dependency order,
//! then issues the single configuration call that binds the created
//! resources together. Any unrecovered failure aborts the run; no partial
//! [`ProvisioningResult`] is ever returned.

use crate::rollup::{rollup_configuration, rollup_graph};
use crate::{ConfigurationPlan, ProvisionConfig, ProvisionError, ResourceGraph};
use indexmap::IndexMap;
use provisioner_deployer::{CallSubmission, ResourceDeployer};
use provisioner_types::{Address, ArgValue, ResourceHandle, ResourceState, Signer};
use tracing::{debug, info, warn};

/// Every created resource, by name, in deployment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningResult {
    handles: IndexMap<String, ResourceHandle>,
}

impl ProvisioningResult {
    pub fn get(&self, name: &str) -> Option<&ResourceHandle> {
        self.handles.get(name)
    }

    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.handles.get(name).map(ResourceHandle::address)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn insert(&mut self, handle: ResourceHandle) -> Result<(), ProvisionError> {
        if self.handles.contains_key(handle.name()) {
            return Err(ProvisionError::DuplicateHandle(handle.name().to_string()));
        }
        self.handles.insert(handle.name().to_string(), handle);
        Ok(())
    }
}

/// Per-resource state at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// Final state of every resource, in deployment order.
    pub states: IndexMap<String, ResourceState>,
    /// Number of creations reconciled from a lost acknowledgement.
    pub recovered: usize,
    /// Whether the configuration call itself was recovered.
    pub configuration_recovered: bool,
}

impl ProvisioningReport {
    pub fn state(&self, name: &str) -> Option<ResourceState> {
        self.states.get(name).copied()
    }

    /// Resources that hold an address, in deployment order.
    pub fn created(&self) -> impl Iterator<Item = (&str, Address)> {
        self.states
            .iter()
            .filter_map(|(name, state)| state.address().map(|addr| (name.as_str(), addr)))
    }

    /// Resources the run never drove to a terminal state.
    pub fn unfinished(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, state)| !state.is_terminal())
            .map(|(name, _)| name.as_str())
    }

    fn transition(&mut self, name: &str, state: ResourceState) {
        debug!(resource = name, state = %state, "Resource state");
        if let ResourceState::Recovered(_) = state {
            self.recovered += 1;
        }
        self.states.insert(name.to_string(), state);
    }
}

/// A completed provisioning run.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub result: ProvisioningResult,
    pub report: ProvisioningReport,
}

/// Run parameters for [`ProvisioningOrchestrator::provision_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionParams {
    /// Maximum batch data size passed to the inbox constructors.
    pub max_data_size: u64,
    /// Request source verification for each resource.
    pub verify: bool,
}

/// Sequences resource deployments and the configuration call.
pub struct ProvisioningOrchestrator {
    deployer: ResourceDeployer,
    config: ProvisionConfig,
}

impl ProvisioningOrchestrator {
    pub fn new(deployer: ResourceDeployer) -> Self {
        Self {
            deployer,
            config: ProvisionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProvisionConfig) -> Self {
        self.config = config;
        self
    }

    /// Provision the rollup graph and configure the rollup creator.
    pub async fn provision_all(
        &self,
        signer: &Signer,
        params: ProvisionParams,
    ) -> Result<Provisioned, ProvisionError> {
        let host_platform = self.deployer.submitter().ledger().is_host_platform().await?;
        info!(host_platform, max_data_size = params.max_data_size, "Provisioning rollup graph");

        let graph = rollup_graph(params.max_data_size, host_platform)?;
        self.provision(&graph, &rollup_configuration(), signer, params.verify)
            .await
    }

    /// Provision `graph` and apply `plan`.
    ///
    /// The plan is checked against the graph before anything is submitted.
    pub async fn provision(
        &self,
        graph: &ResourceGraph,
        plan: &ConfigurationPlan,
        signer: &Signer,
        verify: bool,
    ) -> Result<Provisioned, ProvisionError> {
        if let Some(missing) = plan.resources().find(|name| !graph.contains(name)) {
            return Err(ProvisionError::UnknownSlot(missing.to_string()));
        }
        let order = graph.deployment_order()?;

        let mut report = ProvisioningReport::default();
        for spec in &order {
            report.transition(spec.name(), ResourceState::Pending);
        }

        let mut result = ProvisioningResult::default();
        for spec in order {
            let name = spec.name();
            let args = spec
                .resolve_args(|dependency| result.address_of(dependency))
                .map_err(|source| ProvisionError::Unresolved {
                    resource: name.to_string(),
                    source,
                })?;

            report.transition(name, ResourceState::Submitting);
            match self.deployer.deploy(spec, args, signer, verify).await {
                Ok(deployment) => {
                    let address = deployment.handle.address();
                    match deployment.recovered_from {
                        Some(tx_hash) => {
                            report.transition(name, ResourceState::AmbiguousSubmitted(tx_hash));
                            report.transition(name, ResourceState::Recovered(address));
                        }
                        None => report.transition(name, ResourceState::Created(address)),
                    }
                    result.insert(deployment.handle)?;
                }
                Err(err) => {
                    if let Some(tx_hash) = err.submission_error().and_then(|e| e.tx_hash()) {
                        report.transition(name, ResourceState::AmbiguousSubmitted(tx_hash));
                    }
                    report.transition(name, ResourceState::FailedHard);
                    warn!(
                        resource = name,
                        error = %err,
                        created = report.created().count(),
                        unfinished = report.unfinished().count(),
                        "Provisioning aborted"
                    );
                    return Err(ProvisionError::Deploy {
                        source: err,
                        report: Box::new(report),
                    });
                }
            }
        }

        report.configuration_recovered = self.configure(plan, &result).await?;

        info!(
            resources = result.len(),
            recovered = report.recovered,
            configuration_recovered = report.configuration_recovered,
            "Provisioning complete"
        );
        Ok(Provisioned { result, report })
    }

    /// Issue the configuration call. Returns whether it was recovered.
    async fn configure(
        &self,
        plan: &ConfigurationPlan,
        result: &ProvisioningResult,
    ) -> Result<bool, ProvisionError> {
        let target = result
            .get(&plan.target)
            .ok_or_else(|| ProvisionError::Incomplete(plan.target.clone()))?;
        let addresses = plan
            .slots
            .iter()
            .map(|(resource, _)| {
                result
                    .address_of(resource)
                    .ok_or_else(|| ProvisionError::Incomplete(resource.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request = target.binding().call(
            plan.signature.clone(),
            addresses.iter().copied().map(ArgValue::Address).collect(),
        );
        let submitted = self
            .deployer
            .submitter()
            .submit(&CallSubmission::new(request))
            .await
            .map_err(ProvisionError::Configuration)?;

        info!(
            target = %target.address(),
            signature = %plan.signature,
            recovered = submitted.recovered_from.is_some(),
            "Configured resources"
        );

        let recovered = submitted.recovered_from.is_some();
        if recovered && self.config.verify_configuration {
            self.read_back(plan, target.address(), &addresses).await?;
        }
        Ok(recovered)
    }

    /// Confirm every slot holds the address that was passed for it.
    async fn read_back(
        &self,
        plan: &ConfigurationPlan,
        target: Address,
        expected: &[Address],
    ) -> Result<(), ProvisionError> {
        let ledger = self.deployer.submitter().ledger();
        for ((_, getter), &expected) in plan.slots.iter().zip(expected) {
            let actual = ledger.read_address(target, getter).await?;
            if actual != expected {
                return Err(ProvisionError::ConfigurationMismatch {
                    slot: getter.clone(),
                    expected,
                    actual,
                });
            }
        }
        debug!(slots = expected.len(), "Configuration read back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_deployer::AwaiterConfig;
    use provisioner_simulation::{fixtures, Fault, SimulatedFactory, SimulatedLedger};
    use provisioner_types::{ArgSpec, ResourceSpec};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn orchestrator(ledger: &Arc<SimulatedLedger>) -> ProvisioningOrchestrator {
        let config = AwaiterConfig::default()
            .with_timeout(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(5));
        ProvisioningOrchestrator::new(ResourceDeployer::new(
            ledger.clone(),
            Arc::new(SimulatedFactory::new()),
            config,
        ))
    }

    fn small_graph() -> (ResourceGraph, ConfigurationPlan) {
        let graph = ResourceGraph::from_specs([
            ResourceSpec::artifact("Hub").with_args(vec![ArgSpec::address_of("Leaf")]),
            ResourceSpec::artifact("Leaf"),
            ResourceSpec::artifact("Registry"),
        ])
        .unwrap();
        let plan = ConfigurationPlan {
            target: "Registry".to_string(),
            signature: "setHub(address,address)".to_string(),
            slots: vec![
                ("Hub".to_string(), "hub".to_string()),
                ("Leaf".to_string(), "leaf".to_string()),
            ],
        };
        (graph, plan)
    }

    #[tokio::test]
    async fn test_constructor_args_resolve_to_created_addresses() {
        let ledger = Arc::new(SimulatedLedger::new());
        let (graph, plan) = small_graph();

        let provisioned = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap();

        let leaf = provisioned.result.address_of("Leaf").unwrap();
        assert_eq!(
            ledger.creation_args("Hub"),
            Some(vec![ArgValue::Address(leaf)])
        );
        assert_eq!(ledger.creation_order(), vec!["Leaf", "Hub", "Registry"]);
        assert_eq!(
            provisioned.report.state("Leaf"),
            Some(ResourceState::Created(leaf))
        );
    }

    #[tokio::test]
    async fn test_unknown_slot_rejected_before_any_creation() {
        let ledger = Arc::new(SimulatedLedger::new());
        let (graph, mut plan) = small_graph();
        plan.slots.push(("Missing".to_string(), "missing".to_string()));

        let err = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::UnknownSlot(ref name) if name == "Missing"));
        assert_eq!(ledger.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_hard_failure_stops_before_dependents_and_configuration() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.inject("Leaf", Fault::RejectBeforeBroadcast);
        let (graph, plan) = small_graph();

        let err = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Deploy { .. }));
        assert_eq!(ledger.creation_order(), vec!["Leaf"]);
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hard_failure_carries_report() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.inject("Hub", Fault::DropAcknowledgementAndRevert);
        let (graph, plan) = small_graph();

        let err = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap_err();

        let report = match err {
            ProvisionError::Deploy { report, .. } => report,
            other => panic!("unexpected error: {other}"),
        };
        let leaf = ledger.address_of("Leaf").unwrap();
        assert_eq!(report.created().collect::<Vec<_>>(), vec![("Leaf", leaf)]);
        assert_eq!(report.state("Hub"), Some(ResourceState::FailedHard));
        assert_eq!(report.unfinished().collect::<Vec<_>>(), vec!["Registry"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_recovered_creation_is_reported() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.inject("Hub", Fault::DropAcknowledgement);
        let (graph, plan) = small_graph();

        let provisioned = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap();

        let hub = provisioned.result.address_of("Hub").unwrap();
        assert_eq!(provisioned.report.recovered, 1);
        assert_eq!(
            provisioned.report.state("Hub"),
            Some(ResourceState::Recovered(hub))
        );
        assert_eq!(ledger.creation_attempts("Hub"), 1);
        assert!(logs_contain("Provisioning complete"));
    }

    #[tokio::test]
    async fn test_recovered_configuration_is_read_back() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.map_call_to_getters("setHub", ["hub", "leaf"]);
        ledger.inject("setHub", Fault::DropAcknowledgement);
        let (graph, plan) = small_graph();

        let provisioned = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap();

        assert!(provisioned.report.configuration_recovered);
        assert_eq!(ledger.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_read_back_mismatch_fails() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.map_call_to_getters("setHub", ["hub", "leaf"]);
        ledger.inject("setHub", Fault::DropAcknowledgement);
        let (graph, plan) = small_graph();

        // A clean run on a fresh ledger assigns the same addresses.
        let registry = orchestrator(&Arc::new(SimulatedLedger::new()))
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap()
            .result
            .address_of("Registry")
            .unwrap();
        let stale = Address::new([0x5a; 20]);
        ledger.override_slot(registry, "leaf", stale);

        let err = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap_err();

        match err {
            ProvisionError::ConfigurationMismatch { slot, actual, .. } => {
                assert_eq!(slot, "leaf");
                assert_eq!(actual, stale);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_read_back_can_be_disabled() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.inject("setHub", Fault::DropAcknowledgement);
        let (graph, plan) = small_graph();

        // Nothing is mapped, so a read-back would see zero addresses.
        let provisioned = orchestrator(&ledger)
            .with_config(ProvisionConfig::default().with_verify_configuration(false))
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap();

        assert!(provisioned.report.configuration_recovered);
    }

    #[tokio::test]
    async fn test_failed_configuration_surfaces_original_error() {
        let ledger = Arc::new(SimulatedLedger::new());
        ledger.inject("setHub", Fault::DropAcknowledgementAndRevert);
        let (graph, plan) = small_graph();

        let err = orchestrator(&ledger)
            .provision(&graph, &plan, &fixtures::signer(), false)
            .await
            .unwrap_err();

        match err {
            ProvisionError::Configuration(source) => {
                assert_eq!(Some(source), ledger.last_submission_error());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
