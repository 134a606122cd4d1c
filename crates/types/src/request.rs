//! Remote write requests handed to the ledger client.

use crate::{Address, ArgValue, Signer};

/// A creation call: instantiate a new resource from bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    /// Graph name of the resource being created.
    pub resource: String,
    /// Contract the bytecode was compiled from.
    pub contract: String,
    /// `0x`-prefixed creation bytecode.
    pub bytecode: String,
    /// Constructor signature, e.g. `constructor(uint256,address,bool)`.
    /// `None` when the constructor takes no arguments.
    pub constructor: Option<String>,
    /// Constructor arguments, positionally.
    pub args: Vec<ArgValue>,
    /// Account authorizing the creation.
    pub signer: Signer,
}

/// A configuration call: mutate state of an existing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Resource being called.
    pub target: Address,
    /// Function signature, e.g. `setTemplates(address,address)`.
    pub signature: String,
    /// Call arguments, positionally.
    pub args: Vec<ArgValue>,
    /// Account authorizing the call.
    pub signer: Signer,
}

impl CallRequest {
    /// Function name without the parameter list.
    pub fn function_name(&self) -> &str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(&self.signature)
    }
}
