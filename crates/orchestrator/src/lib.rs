//! Rollup provisioning orchestration.
//!
//! Sits on top of [`provisioner_deployer`]:
//!
//! - [`ResourceGraph`]: named resource specs with dependency edges and a
//!   deterministic deployment order.
//! - [`rollup_graph`] / [`rollup_configuration`]: the fixed rollup resource
//!   set and the `setTemplates` call that wires it together.
//! - [`ProvisioningOrchestrator`]: deploys a graph sequentially, then issues
//!   the configuration call through the same recovering submitter.
//! - [`Bootstrap`] / [`run_bootstrap`]: the end-to-end run that reads
//!   parameters, provisions, creates the child chain and writes manifests.

mod bootstrap;
mod config;
mod error;
mod graph;
mod manifest;
mod params;
mod provision;
mod rollup;

pub use bootstrap::{
    exit_code, run_bootstrap, Bootstrap, BootstrapReport, Collaborators, RunOptions,
};
pub use config::ProvisionConfig;
pub use error::{BootstrapError, GraphError, ManifestError, ParamsError, ProvisionError};
pub use graph::ResourceGraph;
pub use manifest::{render_chain_info, write_manifests, ManifestPaths, CHAIN_NAME_KEY};
pub use params::{BootstrapParams, DEFAULT_MAX_DATA_SIZE};
pub use provision::{
    ProvisionParams, Provisioned, ProvisioningOrchestrator, ProvisioningReport,
    ProvisioningResult,
};
pub use rollup::{
    rollup_configuration, rollup_graph, ConfigurationPlan, TemplateSlot, ERC20_BRIDGE_SET,
    ETH_BRIDGE_SET, READER_4844, ROLLUP_CREATOR, SET_TEMPLATES, TEMPLATE_SLOTS,
};
