//! Per-resource provisioning state.

use crate::{Address, TxHash};
use std::fmt;

/// Lifecycle of a single resource within one provisioning run.
///
/// `Pending -> Submitting -> { Created | AmbiguousSubmitted -> (Recovered | FailedHard) }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Not yet submitted.
    Pending,
    /// Creation call in flight.
    Submitting,
    /// Acknowledged cleanly.
    Created(Address),
    /// Broadcast observed but acknowledgement lost; reconciling against the ledger.
    AmbiguousSubmitted(TxHash),
    /// Reconciled: the ledger confirmed the earlier broadcast.
    Recovered(Address),
    /// Terminal failure. Aborts the run.
    FailedHard,
}

impl ResourceState {
    /// Whether the resource ended with a usable address.
    pub fn address(&self) -> Option<Address> {
        match self {
            ResourceState::Created(addr) | ResourceState::Recovered(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResourceState::Created(_) | ResourceState::Recovered(_) | ResourceState::FailedHard
        )
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Pending => write!(f, "pending"),
            ResourceState::Submitting => write!(f, "submitting"),
            ResourceState::Created(addr) => write!(f, "created({})", addr),
            ResourceState::AmbiguousSubmitted(tx) => write!(f, "ambiguous({})", tx),
            ResourceState::Recovered(addr) => write!(f, "recovered({})", addr),
            ResourceState::FailedHard => write!(f, "failed"),
        }
    }
}
