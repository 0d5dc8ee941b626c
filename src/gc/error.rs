use thiserror::Error;

use super::heap::Address;

/// Failures reported by [`Collector`](super::Collector) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// The address is neither null nor a live node.
    #[error("address {0} is not allocated")]
    InvalidAddress(Address),

    #[error("variable '{0}' is not bound")]
    UnboundVariable(String),

    /// No free node slot remained after a full collection pass.
    #[error("out of memory: heap of {heap_size} cells is exhausted")]
    OutOfMemory { heap_size: usize },

    /// A stored link points at a reclaimed node. This is a collector bug,
    /// not caller misuse.
    #[error("link of node {address} points to unallocated address {link}; likely a collector bug")]
    InvariantViolation { address: Address, link: i32 },
}

pub type GcResult<T> = Result<T, GcError>;
