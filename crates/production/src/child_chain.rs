//! Child-chain creation by an operator-supplied program.
//!
//! The program receives the run's inputs in its environment and must print
//! a single JSON document on stdout:
//!
//! ```json
//! { "rollupCreationResult": { ... }, "chainInfo": { ... } }
//! ```

use crate::toolchain::capture;
use async_trait::async_trait;
use provisioner_core::{ChildChain, ChildChainCreator, ChildChainError, ChildChainRequest};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::info;

/// [`ChildChainCreator`] that runs an external command.
#[derive(Debug, Clone)]
pub struct CommandChildChainCreator {
    program: PathBuf,
    args: Vec<String>,
    parent_chain_rpc: String,
    parent_chain_id: u64,
}

impl CommandChildChainCreator {
    pub fn new(
        program: impl Into<PathBuf>,
        parent_chain_rpc: impl Into<String>,
        parent_chain_id: u64,
    ) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            parent_chain_rpc: parent_chain_rpc.into(),
            parent_chain_id,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Environment handed to the program.
    pub fn environment(&self, request: &ChildChainRequest) -> Vec<(&'static str, String)> {
        vec![
            ("ROLLUP_CREATOR_ADDRESS", request.rollup_creator.to_hex()),
            ("FEE_TOKEN_ADDRESS", request.fee_token.to_hex()),
            ("DEV_DEPLOYMENT", request.dev_deployment.to_string()),
            ("PARENT_CHAIN_RPC", self.parent_chain_rpc.clone()),
            ("PARENT_CHAIN_ID", self.parent_chain_id.to_string()),
            ("DEPLOYER_PRIVKEY", request.signer.key().expose().to_string()),
        ]
    }
}

/// Parse the program's stdout.
pub fn parse_child_chain(stdout: &str) -> Result<ChildChain, ChildChainError> {
    serde_json::from_str(stdout.trim()).map_err(|e| ChildChainError::Malformed(e.to_string()))
}

#[async_trait]
impl ChildChainCreator for CommandChildChainCreator {
    async fn create_child_chain(
        &self,
        request: &ChildChainRequest,
    ) -> Result<ChildChain, ChildChainError> {
        info!(
            program = %self.program.display(),
            rollup_creator = %request.rollup_creator,
            "Creating child chain"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.environment(request))
            .stdin(std::process::Stdio::null());
        let output = capture(&mut command).await?;

        if !output.success {
            return Err(ChildChainError::Failed(output.diagnostic()));
        }
        parse_child_chain(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_types::{Address, PrivateKey, Signer};

    fn request() -> ChildChainRequest {
        ChildChainRequest {
            signer: Signer::new(Address::new([1; 20]), PrivateKey::new("0xkey")),
            dev_deployment: true,
            rollup_creator: Address::new([0xcc; 20]),
            fee_token: Address::ZERO,
        }
    }

    #[test]
    fn test_environment() {
        let creator = CommandChildChainCreator::new("create-rollup", "http://l1:8545", 1337);
        let env = creator.environment(&request());

        assert!(env.contains(&("ROLLUP_CREATOR_ADDRESS", format!("0x{}", "cc".repeat(20)))));
        assert!(env.contains(&("DEV_DEPLOYMENT", "true".to_string())));
        assert!(env.contains(&("PARENT_CHAIN_ID", "1337".to_string())));
        assert!(env.contains(&("FEE_TOKEN_ADDRESS", Address::ZERO.to_hex())));
    }

    #[test]
    fn test_parse_child_chain() {
        let chain = parse_child_chain(
            r#"{"rollupCreationResult":{"rollup":"0x01"},"chainInfo":{"chain-id":412346}}"#,
        )
        .unwrap();
        assert_eq!(chain.chain_info["chain-id"], 412346);

        assert!(matches!(
            parse_child_chain("Deploying...\n"),
            Err(ChildChainError::Malformed(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_output_and_failure() {
        let ok = CommandChildChainCreator::new("sh", "http://l1:8545", 1337).with_args(vec![
            "-c".to_string(),
            r#"printf '{"rollupCreationResult":{"rollup":"%s"},"chainInfo":{}}' "$ROLLUP_CREATOR_ADDRESS""#
                .to_string(),
        ]);
        let chain = ok.create_child_chain(&request()).await.unwrap();
        assert_eq!(
            chain.rollup_creation_result["rollup"],
            format!("0x{}", "cc".repeat(20))
        );

        let failing = CommandChildChainCreator::new("sh", "http://l1:8545", 1337).with_args(vec![
            "-c".to_string(),
            "echo 'insufficient funds' >&2; exit 3".to_string(),
        ]);
        assert!(matches!(
            failing.create_child_chain(&request()).await,
            Err(ChildChainError::Failed(ref msg)) if msg == "insufficient funds"
        ));
    }
}
