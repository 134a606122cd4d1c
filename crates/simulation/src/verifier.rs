//! Verifier that records requests and returns scripted outcomes.

use async_trait::async_trait;
use parking_lot::Mutex;
use provisioner_core::{VerificationOutcome, VerificationRequest, Verifier};
use std::collections::HashMap;

/// Returns [`VerificationOutcome::Verified`] unless an outcome is scripted
/// for the contract.
#[derive(Default)]
pub struct RecordingVerifier {
    outcomes: HashMap<String, VerificationOutcome>,
    panics: bool,
    requests: Mutex<Vec<VerificationRequest>>,
}

impl RecordingVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for `contract`.
    pub fn with_outcome(mut self, contract: &str, outcome: VerificationOutcome) -> Self {
        self.outcomes.insert(contract.to_string(), outcome);
        self
    }

    /// Panic on every request, after recording it.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Verifier for RecordingVerifier {
    async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        self.requests.lock().push(request.clone());
        if self.panics {
            panic!("verifier exploded for {}", request.contract);
        }
        self.outcomes
            .get(&request.contract)
            .cloned()
            .unwrap_or(VerificationOutcome::Verified)
    }
}
