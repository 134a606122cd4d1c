//! Shared test fixtures.

use provisioner_types::{Address, CallRequest, CreationRequest, PrivateKey, Signer};

/// Well-known development account.
pub fn signer() -> Signer {
    Signer::new(
        Address::new([0xf3; 20]),
        PrivateKey::new("0xb6b15c8cb491557369f3c7d2c287b053eb229daa9c22138887752191c9520659"),
    )
}

/// Argument-less creation request for `resource`.
pub fn creation_request(resource: &str) -> CreationRequest {
    CreationRequest {
        resource: resource.to_string(),
        contract: resource.to_string(),
        bytecode: "0x6080604052".to_string(),
        constructor: None,
        args: Vec::new(),
        signer: signer(),
    }
}

/// Argument-less call request.
pub fn call_request(target: Address, signature: &str) -> CallRequest {
    CallRequest {
        target,
        signature: signature.to_string(),
        args: Vec::new(),
        signer: signer(),
    }
}
