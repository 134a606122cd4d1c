//! Source verification requests and outcomes.

use provisioner_types::{Address, ArgValue};
use std::fmt;

/// Everything a verification service needs to match deployed code to source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Contract name as compiled.
    pub contract: String,
    /// Deployed address.
    pub address: Address,
    /// Constructor signature used at creation, if any.
    pub constructor: Option<String>,
    /// Constructor arguments used at creation.
    pub constructor_args: Vec<ArgValue>,
    /// Optional `path:Name` hint when the contract name alone is ambiguous.
    pub source_path: Option<String>,
}

/// Result of a verification attempt. Never an error: failures are data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    Failed(String),
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationOutcome::Verified => write!(f, "verified"),
            VerificationOutcome::AlreadyVerified => write!(f, "already verified"),
            VerificationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
