//! Best-effort verification side channel.

use futures::FutureExt;
use provisioner_core::{VerificationOutcome, VerificationRequest, Verifier};
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

/// Run verification and log the result. Never fails, never panics.
pub async fn verify_best_effort(
    verifier: &dyn Verifier,
    request: &VerificationRequest,
) -> VerificationOutcome {
    let outcome = AssertUnwindSafe(verifier.verify(request))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| VerificationOutcome::Failed("verifier panicked".to_string()));

    match &outcome {
        VerificationOutcome::Verified | VerificationOutcome::AlreadyVerified => {
            info!(
                contract = %request.contract,
                address = %request.address,
                outcome = %outcome,
                "Verification"
            );
        }
        VerificationOutcome::Failed(reason) => {
            warn!(
                contract = %request.contract,
                address = %request.address,
                reason = %reason,
                "Verification failed, continuing"
            );
        }
    }

    outcome
}
