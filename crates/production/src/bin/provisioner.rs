//! Rollup provisioner CLI.
//!
//! Provisions the rollup template contracts on the parent chain, configures
//! the rollup creator, runs child-chain creation and writes the deployment
//! and chain-info manifests. Run parameters come from the environment
//! (`CHILD_CHAIN_NAME`, `DEPLOYER_PRIVKEY`, `PARENT_CHAIN_RPC`,
//! `PARENT_CHAIN_ID`, ...); adapter settings come from flags.

use clap::Parser;
use provisioner_deployer::AwaiterConfig;
use provisioner_orchestrator::{run_bootstrap, ProvisionConfig, RunOptions};
use provisioner_production::{connect, ProductionOptions, Toolchain};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollup-provisioner")]
#[command(about = "Provision rollup template contracts and create a child chain")]
#[command(version)]
struct Cli {
    /// Directory with compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = "out")]
    artifacts: PathBuf,

    /// Child-chain creation program and its arguments (space-separated)
    #[arg(long, env = "CHILD_CHAIN_COMMAND", value_delimiter = ' ', required = true)]
    child_chain_command: Vec<String>,

    /// Path to the `cast` executable
    #[arg(long, env = "CAST_BIN", default_value = "cast")]
    cast: PathBuf,

    /// Path to the `forge` executable
    #[arg(long, env = "FORGE_BIN", default_value = "forge")]
    forge: PathBuf,

    /// Contracts project root, used as the working directory for `forge`
    #[arg(long, env = "CONTRACTS_ROOT")]
    project_root: Option<PathBuf>,

    /// How long to wait for a transaction during recovery (e.g. "3m")
    #[arg(long, default_value = "180s")]
    receipt_timeout: humantime::Duration,

    /// Delay between receipt queries
    #[arg(long, default_value = "2s")]
    poll_interval: humantime::Duration,

    /// How long a broadcast may go without a receipt before it is treated
    /// as unacknowledged
    #[arg(long, default_value = "60s")]
    ack_timeout: humantime::Duration,

    /// Per-request JSON-RPC timeout
    #[arg(long, default_value = "30s")]
    request_timeout: humantime::Duration,

    /// Budget for a single source verification
    #[arg(long, default_value = "5m")]
    verify_timeout: humantime::Duration,

    /// Extra flag passed to `forge verify-contract` (repeatable)
    #[arg(long = "verifier-arg", allow_hyphen_values = true)]
    verifier_args: Vec<String>,

    /// Do not read template slots back after a recovered configuration call
    #[arg(long)]
    skip_configuration_readback: bool,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions::default()
            .with_awaiter(
                AwaiterConfig::default()
                    .with_timeout(*self.receipt_timeout)
                    .with_poll_interval(*self.poll_interval),
            )
            .with_provision(
                ProvisionConfig::default()
                    .with_verify_configuration(!self.skip_configuration_readback),
            )
    }

    fn production_options(self) -> ProductionOptions {
        ProductionOptions {
            artifacts_dir: self.artifacts,
            toolchain: Toolchain {
                cast: self.cast,
                forge: self.forge,
                project_root: self.project_root,
            },
            child_chain_command: self.child_chain_command,
            request_timeout: self.request_timeout.into(),
            ack_timeout: self.ack_timeout.into(),
            verify_timeout: self.verify_timeout.into(),
            verifier_args: self.verifier_args,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = cli.run_options();
    let production = cli.production_options();

    let result = run_bootstrap(
        |key| std::env::var(key).ok(),
        options,
        |params| async move { connect(&params, &production).await },
    )
    .await;

    match result {
        Ok(report) => {
            info!(
                rollup_creator = %report.rollup_creator,
                resources = report.provisioned.result.len(),
                recovered = report.provisioned.report.recovered,
                deployment = %report.manifests.deployment.display(),
                chain_info = %report.manifests.chain_info.display(),
                "Bootstrap complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            error!("Bootstrap failed: {:#}", anyhow::Error::new(err));
            ExitCode::from(code)
        }
    }
}
