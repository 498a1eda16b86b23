//! Constants for contract deployment.
//!
//! Storage fees are grouped separately from the sandbox limits since they are the only values a
//! [`DeployConfig`](crate::DeployConfig) may override.

/// Storage fees charged when a deployment persists its object graph.
pub mod storage {
    /// Energy charged per byte of serialized object graph written to storage.
    pub const WRITE_PRICE_PER_BYTE: u64 = 3;

    /// Hard upper bound on the size of a serialized object graph, in bytes. A graph larger than
    /// this fails the deployment instead of being partially written.
    pub const MAX_GRAPH_SIZE: usize = 500_000;
}

/// Limits of the sandbox execution context.
pub mod sandbox {
    /// The first object identity handed out during a fresh deployment.
    pub const INITIAL_NEXT_HASH_CODE: u32 = 1;

    /// Maximum depth of nested method invocations inside one sandbox frame.
    pub const MAX_STACK_DEPTH: u32 = 512;
}

/// Bounds of the status codes reserved for user reversions.
pub mod status {
    /// The first status code available to user reversions.
    pub const USER_REVERSION_START: u32 = 32;
    /// The last status code available to user reversions.
    pub const USER_REVERSION_END: u32 = 1000;
}

pub use sandbox::*;
pub use storage::*;
pub use status::*;
