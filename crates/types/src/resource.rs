//! Resource specifications and the handles produced by deploying them.

use crate::{Address, ArgSpec, ArgValue, CallRequest, Signer, UnresolvedReference};
use std::collections::BTreeSet;

/// Where a resource's creation code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeTemplate {
    /// A compiled contract looked up by name in the creation backend.
    Artifact {
        /// Contract name, e.g. `SequencerInbox`.
        contract: String,
    },
    /// Raw creation code shipped alongside its constructor ABI.
    Raw {
        /// `0x`-prefixed creation bytecode.
        bytecode: String,
        /// Constructor signature, if the constructor takes arguments.
        constructor: Option<String>,
    },
}

impl CodeTemplate {
    /// Reference a compiled contract by name.
    pub fn artifact(contract: impl Into<String>) -> Self {
        CodeTemplate::Artifact {
            contract: contract.into(),
        }
    }
}

/// Static description of one resource in a provisioning graph.
///
/// Immutable once built. Dependencies are derived from every
/// [`ArgSpec::AddressOf`] in the constructor arguments, plus any explicit
/// ordering edges added with [`ResourceSpec::after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    name: String,
    template: CodeTemplate,
    constructor_args: Vec<ArgSpec>,
    depends_on: BTreeSet<String>,
    source_path: Option<String>,
    verifiable: bool,
}

impl ResourceSpec {
    /// A resource with no constructor arguments.
    pub fn new(name: impl Into<String>, template: CodeTemplate) -> Self {
        Self {
            name: name.into(),
            template,
            constructor_args: Vec::new(),
            depends_on: BTreeSet::new(),
            source_path: None,
            verifiable: true,
        }
    }

    /// Shorthand for a resource whose name matches its artifact.
    pub fn artifact(name: impl Into<String>) -> Self {
        let name = name.into();
        let template = CodeTemplate::artifact(name.clone());
        Self::new(name, template)
    }

    /// Set constructor arguments, recording their references as dependencies.
    pub fn with_args(mut self, args: Vec<ArgSpec>) -> Self {
        for arg in &args {
            self.depends_on.extend(arg.references());
        }
        self.constructor_args = args;
        self
    }

    /// Add an ordering edge that is not visible in the arguments.
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.depends_on.insert(name.into());
        self
    }

    /// Source path hint for verification, e.g. `src/bridge/Inbox.sol:Inbox`.
    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Exclude this resource from source verification.
    pub fn unverified(mut self) -> Self {
        self.verifiable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &CodeTemplate {
        &self.template
    }

    pub fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn is_verifiable(&self) -> bool {
        self.verifiable
    }

    /// Resolve constructor arguments against already-created addresses.
    pub fn resolve_args<F>(&self, lookup: F) -> Result<Vec<ArgValue>, UnresolvedReference>
    where
        F: Fn(&str) -> Option<Address>,
    {
        self.constructor_args
            .iter()
            .map(|arg| arg.resolve(&lookup))
            .collect()
    }
}

/// A callable reference to a created resource, scoped to a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    address: Address,
    signer: Signer,
}

impl ContractBinding {
    pub fn new(address: Address, signer: Signer) -> Self {
        Self { address, signer }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Build a state-changing call against this resource.
    pub fn call(&self, signature: impl Into<String>, args: Vec<ArgValue>) -> CallRequest {
        CallRequest {
            target: self.address,
            signature: signature.into(),
            args,
            signer: self.signer.clone(),
        }
    }
}

/// A created resource. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    name: String,
    binding: ContractBinding,
}

impl ResourceHandle {
    pub fn new(name: impl Into<String>, address: Address, signer: Signer) -> Self {
        Self {
            name: name.into(),
            binding: ContractBinding::new(address, signer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.binding.address()
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrivateKey;

    #[test]
    fn test_dependencies_follow_arguments_and_explicit_edges() {
        let spec = ResourceSpec::artifact("OneStepProofEntry")
            .with_args(vec![
                ArgSpec::address_of("OneStepProver0"),
                ArgSpec::address_of("OneStepProverMemory"),
            ])
            .after("Bridge");

        let deps: Vec<_> = spec.depends_on().iter().cloned().collect();
        assert_eq!(deps, vec!["Bridge", "OneStepProver0", "OneStepProverMemory"]);
    }

    #[test]
    fn test_raw_template_can_be_unverified() {
        let spec = ResourceSpec::new(
            "Reader4844",
            CodeTemplate::Raw {
                bytecode: "0x00".to_string(),
                constructor: None,
            },
        )
        .unverified();

        assert!(matches!(spec.template(), CodeTemplate::Raw { .. }));
        assert!(!spec.is_verifiable());
    }

    #[test]
    fn test_binding_builds_call_for_its_signer() {
        let signer = Signer::new(Address::new([9; 20]), PrivateKey::new("k"));
        let handle = ResourceHandle::new("RollupCreator", Address::new([7; 20]), signer.clone());

        let call = handle
            .binding()
            .call("setTemplates(address)", vec![ArgValue::Address(Address::ZERO)]);
        assert_eq!(call.target, handle.address());
        assert_eq!(call.signer, signer);
    }
}
