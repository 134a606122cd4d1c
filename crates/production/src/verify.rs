//! Source verification through `forge verify-contract`.

use crate::toolchain::ToolOutput;
use crate::Toolchain;
use async_trait::async_trait;
use provisioner_core::{VerificationOutcome, VerificationRequest, Verifier};
use std::time::Duration;
use tokio::time::timeout;

/// Default budget for a single verification, including explorer polling.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(300);

/// [`Verifier`] that shells out to `forge`.
pub struct ForgeVerifier {
    toolchain: Toolchain,
    rpc_url: String,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl ForgeVerifier {
    pub fn new(toolchain: Toolchain, rpc_url: impl Into<String>) -> Self {
        Self {
            toolchain,
            rpc_url: rpc_url.into(),
            extra_args: Vec::new(),
            timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    /// Extra flags for `forge verify-contract`, e.g. `--verifier blockscout`.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// ABI-encode constructor arguments with `cast abi-encode`.
    async fn encode_constructor_args(
        &self,
        request: &VerificationRequest,
    ) -> Result<Option<String>, String> {
        let constructor = match &request.constructor {
            Some(sig) if !request.constructor_args.is_empty() => sig,
            _ => return Ok(None),
        };

        let mut args = vec!["abi-encode".to_string(), constructor.clone()];
        args.extend(request.constructor_args.iter().map(ToString::to_string));
        let output = self
            .toolchain
            .cast(args)
            .await
            .map_err(|e| format!("cannot run cast: {e}"))?;
        if !output.success {
            return Err(output.diagnostic());
        }
        output
            .last_line()
            .map(|line| Some(line.to_string()))
            .ok_or_else(|| "cast abi-encode printed nothing".to_string())
    }

    fn verify_args(&self, request: &VerificationRequest, encoded: Option<String>) -> Vec<String> {
        let mut args = vec![
            "verify-contract".to_string(),
            "--rpc-url".to_string(),
            self.rpc_url.clone(),
            "--watch".to_string(),
        ];
        if let Some(encoded) = encoded {
            args.push("--constructor-args".to_string());
            args.push(encoded);
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(request.address.to_hex());
        args.push(
            request
                .source_path
                .clone()
                .unwrap_or_else(|| request.contract.clone()),
        );
        args
    }

    async fn attempt(&self, request: &VerificationRequest) -> VerificationOutcome {
        let encoded = match self.encode_constructor_args(request).await {
            Ok(encoded) => encoded,
            Err(reason) => {
                return VerificationOutcome::Failed(format!("constructor args: {reason}"))
            }
        };
        match self.toolchain.forge(self.verify_args(request, encoded)).await {
            Ok(output) => classify(&output),
            Err(e) => VerificationOutcome::Failed(format!("cannot run forge: {e}")),
        }
    }
}

/// Map `forge verify-contract` output to an outcome.
pub fn classify(output: &ToolOutput) -> VerificationOutcome {
    let combined = format!("{}\n{}", output.stdout, output.stderr).to_lowercase();
    if combined.contains("already verified") {
        VerificationOutcome::AlreadyVerified
    } else if output.success {
        VerificationOutcome::Verified
    } else {
        VerificationOutcome::Failed(output.diagnostic())
    }
}

#[async_trait]
impl Verifier for ForgeVerifier {
    async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        match timeout(self.timeout, self.attempt(request)).await {
            Ok(outcome) => outcome,
            Err(_) => VerificationOutcome::Failed(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_types::{Address, ArgValue};

    fn output(success: bool, stdout: &str, stderr: &str) -> ToolOutput {
        ToolOutput {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    fn request() -> VerificationRequest {
        VerificationRequest {
            contract: "UpgradeExecutor".to_string(),
            address: Address::new([0x10; 20]),
            constructor: None,
            constructor_args: Vec::new(),
            source_path: Some(
                "node_modules/@offchainlabs/upgrade-executor/src/UpgradeExecutor.sol:UpgradeExecutor"
                    .to_string(),
            ),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&output(true, "Contract successfully verified", "")),
            VerificationOutcome::Verified
        );
        assert_eq!(
            classify(&output(false, "", "Error: Contract source code already verified")),
            VerificationOutcome::AlreadyVerified
        );
        assert_eq!(
            classify(&output(false, "", "Error: explorer unreachable\n")),
            VerificationOutcome::Failed("Error: explorer unreachable".to_string())
        );
    }

    #[test]
    fn test_source_path_is_preferred() {
        let verifier = ForgeVerifier::new(Toolchain::default(), "http://localhost:8545");
        let args = verifier.verify_args(&request(), Some("0xabcd".to_string()));

        assert_eq!(args.last().unwrap(), request().source_path.as_ref().unwrap());
        assert!(args.windows(2).any(|w| w[0] == "--constructor-args" && w[1] == "0xabcd"));
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_failure_not_error() {
        let toolchain = Toolchain {
            cast: "/nonexistent/cast".into(),
            forge: "/nonexistent/forge".into(),
            project_root: None,
        };
        let verifier = ForgeVerifier::new(toolchain, "http://localhost:8545");
        let mut req = request();
        req.constructor = Some("constructor(uint256)".to_string());
        req.constructor_args = vec![ArgValue::Uint(1)];

        assert!(matches!(
            verifier.verify(&req).await,
            VerificationOutcome::Failed(_)
        ));
        req.constructor = None;
        assert!(matches!(
            verifier.verify(&req).await,
            VerificationOutcome::Failed(_)
        ));
    }
}
