//! End-to-end bootstrap runs against the simulated collaborators.

use provisioner_core::{ContractFactory, VerificationOutcome};
use provisioner_deployer::AwaiterConfig;
use provisioner_orchestrator::{
    exit_code, run_bootstrap, BootstrapError, Collaborators, ProvisionError, RunOptions,
    ETH_BRIDGE_SET, READER_4844, ROLLUP_CREATOR, SET_TEMPLATES, TEMPLATE_SLOTS,
};
use provisioner_simulation::{
    fixtures, Fault, RecordingVerifier, SimulatedChildChainCreator, SimulatedFactory,
    SimulatedLedger, SIMULATED_CHAIN_ID,
};
use provisioner_types::{Address, ArgValue, ResourceState};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Resources in the rollup graph off the host platform.
const FULL_GRAPH: usize = 25;

struct Harness {
    ledger: Arc<SimulatedLedger>,
    verifier: Arc<RecordingVerifier>,
    child_chain: Arc<SimulatedChildChainCreator>,
    factory: Arc<dyn ContractFactory>,
    dir: TempDir,
    env: HashMap<String, String>,
}

impl Harness {
    fn new(ledger: SimulatedLedger) -> Self {
        let ledger = Arc::new(ledger);
        let getters = TEMPLATE_SLOTS.iter().map(|slot| slot.getter);
        ledger.map_call_to_getters("setTemplates", getters);

        let dir = tempfile::tempdir().unwrap();
        let mut env = HashMap::new();
        env.insert("CHILD_CHAIN_NAME".to_string(), "orbit-devnet".to_string());
        env.insert(
            "DEPLOYER_PRIVKEY".to_string(),
            fixtures::signer().key().expose().to_string(),
        );
        env.insert("PARENT_CHAIN_RPC".to_string(), "http://127.0.0.1:8545".to_string());
        env.insert("PARENT_CHAIN_ID".to_string(), "1337".to_string());
        env.insert(
            "DEPLOYMENT_FILE".to_string(),
            dir.path().join("deployment.json").display().to_string(),
        );
        env.insert(
            "CHAIN_INFO_FILE".to_string(),
            dir.path().join("l2_chain_info.json").display().to_string(),
        );

        Self {
            ledger,
            verifier: Arc::new(RecordingVerifier::new()),
            child_chain: Arc::new(SimulatedChildChainCreator::new()),
            factory: Arc::new(SimulatedFactory::new()),
            dir,
            env,
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    fn unset(&mut self, key: &str) {
        self.env.remove(key);
    }

    fn manifest(&self, name: &str) -> Option<Value> {
        let raw = std::fs::read_to_string(self.dir.path().join(name)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            ledger: self.ledger.clone(),
            factory: self.factory.clone(),
            verifier: Some(self.verifier.clone()),
            child_chain: self.child_chain.clone(),
            signer: fixtures::signer(),
        }
    }

    async fn run(&self) -> Result<provisioner_orchestrator::BootstrapReport, BootstrapError> {
        let options = RunOptions::default().with_awaiter(
            AwaiterConfig::default()
                .with_timeout(Duration::from_millis(200))
                .with_poll_interval(Duration::from_millis(5)),
        );
        let env = self.env.clone();
        let collaborators = self.collaborators();
        run_bootstrap(
            move |key| env.get(key).cloned(),
            options,
            |_params| async move { Ok(collaborators) },
        )
        .await
    }
}

fn distinct_addresses(ledger: &SimulatedLedger) -> HashSet<Address> {
    ledger.created().iter().map(|c| c.address).collect()
}

#[tokio::test]
async fn test_clean_run_writes_both_manifests() {
    let harness = Harness::new(SimulatedLedger::new());

    let result = harness.run().await;
    assert_eq!(exit_code(&result), 0);
    let report = result.unwrap();

    assert_eq!(report.provisioned.result.len(), FULL_GRAPH);
    assert_eq!(
        Some(report.rollup_creator),
        harness.ledger.address_of(ROLLUP_CREATOR)
    );

    let deployment = harness.manifest("deployment.json").unwrap();
    assert_eq!(deployment, report.chain.rollup_creation_result);

    let chain_info = harness.manifest("l2_chain_info.json").unwrap();
    let entries = chain_info.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["chain-name"], "orbit-devnet");
    assert_eq!(entries[0]["chain-id"], SIMULATED_CHAIN_ID);

    assert_eq!(
        harness.child_chain.requests(),
        vec![(true, report.rollup_creator, Address::ZERO)]
    );
}

#[tokio::test]
async fn test_missing_chain_name_fails_before_any_remote_call() {
    let mut harness = Harness::new(SimulatedLedger::new());
    harness.unset("CHILD_CHAIN_NAME");
    let connected = AtomicBool::new(false);

    let env = harness.env.clone();
    let collaborators = harness.collaborators();
    let result = run_bootstrap(
        move |key| env.get(key).cloned(),
        RunOptions::default(),
        |_params| {
            connected.store(true, Ordering::SeqCst);
            async move { Ok(collaborators) }
        },
    )
    .await;

    assert_ne!(exit_code(&result), 0);
    assert!(matches!(result, Err(BootstrapError::Params(_))));
    assert!(!connected.load(Ordering::SeqCst));
    assert_eq!(harness.ledger.remote_calls(), 0);
    assert!(harness.manifest("deployment.json").is_none());
    assert!(harness.manifest("l2_chain_info.json").is_none());
}

#[tokio::test]
async fn test_dropped_acknowledgement_yields_no_duplicates() {
    let clean = Harness::new(SimulatedLedger::new());
    let clean_report = clean.run().await.unwrap();

    let harness = Harness::new(SimulatedLedger::new().with_inclusion_delay(3));
    harness.ledger.inject("OneStepProverMath", Fault::DropAcknowledgement);

    let report = harness.run().await.unwrap();

    assert_eq!(harness.ledger.total_creation_attempts(), FULL_GRAPH);
    assert_eq!(harness.ledger.creation_attempts("OneStepProverMath"), 1);
    assert_eq!(distinct_addresses(&harness.ledger).len(), FULL_GRAPH);
    assert_eq!(report.provisioned.report.recovered, 1);
    assert_eq!(
        report.provisioned.result.address_of("OneStepProverMath"),
        clean_report.provisioned.result.address_of("OneStepProverMath")
    );
    assert_eq!(report.rollup_creator, clean_report.rollup_creator);
}

#[tokio::test]
async fn test_configuration_slots_follow_declared_order() {
    let harness = Harness::new(SimulatedLedger::new());
    let report = harness.run().await.unwrap();

    let calls = harness.ledger.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.signature, SET_TEMPLATES);
    assert_eq!(call.target, report.rollup_creator);

    let expected: Vec<ArgValue> = TEMPLATE_SLOTS
        .iter()
        .map(|slot| ArgValue::Address(harness.ledger.address_of(slot.resource).unwrap()))
        .collect();
    assert_eq!(call.args, expected);

    // DeployHelper is created after RollupCreator yet fills the last slot.
    let order = harness.ledger.creation_order();
    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(pos("DeployHelper") > pos(ROLLUP_CREATOR));
}

#[tokio::test]
async fn test_failed_creation_skips_configuration_and_manifests() {
    let harness = Harness::new(SimulatedLedger::new());
    harness.ledger.inject("ChallengeManager", Fault::DropAcknowledgementAndRevert);

    let result = harness.run().await;
    assert_eq!(exit_code(&result), 1);

    let err = result.unwrap_err();
    let original = harness.ledger.last_submission_error().unwrap();
    match err {
        BootstrapError::Provision(ProvisionError::Deploy { source, report }) => {
            assert_eq!(source.submission_error(), Some(&original));
            assert_eq!(report.state("ChallengeManager"), Some(ResourceState::FailedHard));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(harness.ledger.calls().is_empty());
    assert!(harness.ledger.address_of("RollupUserLogic").is_none());
    assert!(harness.child_chain.requests().is_empty());
    assert!(harness.manifest("deployment.json").is_none());
}

#[tokio::test]
async fn test_host_platform_passes_zero_blob_reader() {
    let harness = Harness::new(SimulatedLedger::new().with_host_platform(true));
    let report = harness.run().await.unwrap();

    assert_eq!(report.provisioned.result.len(), FULL_GRAPH - 1);
    assert!(harness.ledger.address_of(READER_4844).is_none());
    let args = harness.ledger.creation_args("EthSequencerInbox").unwrap();
    assert_eq!(args[1], ArgValue::Address(Address::ZERO));
}

#[tokio::test]
async fn test_blob_reader_deployed_off_host_platform() {
    let harness = Harness::new(SimulatedLedger::new());
    harness.run().await.unwrap();

    let reader = harness.ledger.address_of(READER_4844).unwrap();
    assert_eq!(harness.ledger.creation_order()[0], READER_4844);
    for inbox in ["EthSequencerInbox", "Erc20SequencerInbox"] {
        let args = harness.ledger.creation_args(inbox).unwrap();
        assert_eq!(args[1], ArgValue::Address(reader));
    }
    // Blob reader is excluded from verification.
    assert!(harness
        .verifier
        .requests()
        .iter()
        .all(|r| r.contract != READER_4844));
}

#[tokio::test]
async fn test_bridge_creator_receives_both_bridge_sets() {
    let harness = Harness::new(SimulatedLedger::new());
    harness.run().await.unwrap();

    let args = harness.ledger.creation_args("BridgeCreator").unwrap();
    let eth: Vec<ArgValue> = ETH_BRIDGE_SET
        .iter()
        .map(|name| ArgValue::Address(harness.ledger.address_of(name).unwrap()))
        .collect();
    assert_eq!(args.len(), 2);
    assert_eq!(args[0], ArgValue::Tuple(eth));
}

#[tokio::test]
async fn test_recovered_configuration_mismatch_fails_run() {
    let clean = Harness::new(SimulatedLedger::new());
    let creator = clean.run().await.unwrap().rollup_creator;

    let harness = Harness::new(SimulatedLedger::new());
    harness.ledger.inject("setTemplates", Fault::DropAcknowledgement);
    harness
        .ledger
        .override_slot(creator, "osp", Address::new([0xee; 20]));

    let err = harness.run().await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Provision(ProvisionError::ConfigurationMismatch { ref slot, .. })
            if slot == "osp"
    ));
    assert!(harness.manifest("deployment.json").is_none());
}

#[tokio::test]
async fn test_recovered_configuration_completes() {
    let harness = Harness::new(SimulatedLedger::new().with_inclusion_delay(1));
    harness.ledger.inject("setTemplates", Fault::DropAcknowledgement);

    let report = harness.run().await.unwrap();
    assert!(report.provisioned.report.configuration_recovered);
    assert_eq!(harness.ledger.calls().len(), 1);
}

#[tokio::test]
async fn test_verification_failure_does_not_fail_run() {
    let mut harness = Harness::new(SimulatedLedger::new());
    harness.verifier = Arc::new(
        RecordingVerifier::new()
            .with_outcome("Bridge", VerificationOutcome::Failed("rate limited".to_string())),
    );

    let report = harness.run().await.unwrap();
    assert_eq!(report.provisioned.result.len(), FULL_GRAPH);
    assert_eq!(harness.verifier.requests().len(), FULL_GRAPH - 1);
}

#[tokio::test]
async fn test_disable_verification_skips_verifier() {
    let mut harness = Harness::new(SimulatedLedger::new());
    harness.set("DISABLE_VERIFICATION", "true");

    harness.run().await.unwrap();
    assert!(harness.verifier.requests().is_empty());
}

#[tokio::test]
async fn test_child_chain_failure_writes_no_manifests() {
    let mut harness = Harness::new(SimulatedLedger::new());
    harness.child_chain = Arc::new(SimulatedChildChainCreator::failing("rollup creation reverted"));

    let result = harness.run().await;
    assert_eq!(exit_code(&result), 1);
    assert!(matches!(result, Err(BootstrapError::ChildChain(_))));
    assert!(harness.manifest("deployment.json").is_none());
    assert!(harness.manifest("l2_chain_info.json").is_none());
}

#[tokio::test]
async fn test_manifest_failure_reports_existing_state() {
    let mut harness = Harness::new(SimulatedLedger::new());
    let unwritable = harness.dir.path().join("missing").join("deployment.json");
    harness.set("DEPLOYMENT_FILE", &unwritable.display().to_string());

    let err = harness.run().await.unwrap_err();
    let message = err.to_string();

    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err, BootstrapError::Manifest { .. }));
    assert!(message.contains("resources exist on the ledger"));
    assert!(message.contains(&harness.ledger.address_of(ROLLUP_CREATOR).unwrap().to_hex()));

    // The created child chain survives in the error for manual manifest recovery.
    let rollup = Address::new([0xe1; 20]).to_hex();
    assert!(message.contains(&rollup));
    match &err {
        BootstrapError::Manifest { chain, .. } => {
            assert_eq!(chain.rollup_creation_result["rollup"], Value::from(rollup));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!Path::new(&unwritable).exists());
    assert!(harness.manifest("l2_chain_info.json").is_none());
}
