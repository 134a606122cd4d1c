//! Signing identity used to authorize and pay for remote calls.

use crate::Address;
use std::fmt;

/// Raw signing key material.
///
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Wrap a hex-encoded key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key material, for handing to the signing toolchain.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

/// An account credential capable of authorizing calls.
///
/// Nonce management belongs to the ledger layer that signs with this key;
/// callers only issue one in-flight transaction at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    account: Address,
    key: PrivateKey,
}

impl Signer {
    /// Create a signer for `account` holding `key`.
    pub fn new(account: Address, key: PrivateKey) -> Self {
        Self { account, key }
    }

    /// The account address transactions are sent from.
    pub fn account(&self) -> Address {
        self.account
    }

    /// The signing key.
    pub fn key(&self) -> &PrivateKey {
        &self.key
    }
}
