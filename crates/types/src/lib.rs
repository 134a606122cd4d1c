//! Value types shared by every provisioning crate.
//!
//! Nothing here performs I/O. Ledger, factory and verification collaborators
//! live behind the traits in `provisioner-core`.

mod address;
mod hash;
mod receipt;
mod request;
mod resource;
mod signer;
mod state;
mod value;

pub use address::Address;
pub use hash::{HexError, TxHash};
pub use receipt::{Receipt, ReceiptStatus, TransactionOutcome};
pub use request::{CallRequest, CreationRequest};
pub use resource::{CodeTemplate, ContractBinding, ResourceHandle, ResourceSpec};
pub use signer::{PrivateKey, Signer};
pub use state::ResourceState;
pub use value::{ArgSpec, ArgValue, UnresolvedReference};
