//! Creation backend that fabricates bytecode for any contract name.

use provisioner_core::{BackendError, ContractFactory, CreationCode};
use provisioner_types::CodeTemplate;
use std::collections::HashSet;

/// Produces placeholder creation code for every artifact except those
/// explicitly marked missing.
#[derive(Debug, Default)]
pub struct SimulatedFactory {
    missing: HashSet<String>,
}

impl SimulatedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `contract` as having no compiled artifact.
    pub fn without_artifact(mut self, contract: &str) -> Self {
        self.missing.insert(contract.to_string());
        self
    }
}

impl ContractFactory for SimulatedFactory {
    fn creation_code(
        &self,
        resource: &str,
        template: &CodeTemplate,
    ) -> Result<CreationCode, BackendError> {
        match template {
            CodeTemplate::Artifact { contract } => {
                if self.missing.contains(contract) {
                    return Err(BackendError::MissingArtifact {
                        contract: contract.clone(),
                    });
                }
                Ok(CreationCode {
                    contract: contract.clone(),
                    bytecode: format!("0x6080604052{:04x}", contract.len()),
                    constructor: None,
                })
            }
            CodeTemplate::Raw {
                bytecode,
                constructor,
            } => Ok(CreationCode {
                contract: resource.to_string(),
                bytecode: bytecode.clone(),
                constructor: constructor.clone(),
            }),
        }
    }
}
