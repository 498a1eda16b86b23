use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use alloy_primitives::{map::HashMap, Address, Bytes};
use serde::{Deserialize, Serialize};

/// A deployment transaction. Read-only to the deployment core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The energy the sender is willing to spend on this deployment.
    pub energy_limit: u64,
    /// Opaque constructor parameters.
    pub params: Bytes,
    /// The address the contract is deployed to.
    pub target: Address,
}

impl Transaction {
    /// Creates a new deployment transaction.
    pub fn new(energy_limit: u64, params: Bytes, target: Address) -> Self {
        Self { energy_limit, params, target }
    }
}

/// A serialized object graph, tagged with the object-identity watermark it was saved at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectGraph {
    /// The next object identity that would have been assigned when the graph was saved.
    pub next_hash_code: u32,
    /// The serialized graph.
    pub bytes: Bytes,
}

impl ObjectGraph {
    /// Creates a new object graph payload.
    pub fn new(next_hash_code: u32, bytes: impl Into<Bytes>) -> Self {
        Self { next_hash_code, bytes: bytes.into() }
    }

    /// The size of the serialized graph in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the serialized graph is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The output of a [`CodeTransformer`](crate::CodeTransformer).
#[derive(Debug, Clone)]
pub struct TransformedDapp<M> {
    /// The sandboxed, loadable module.
    pub module: M,
    /// The API descriptor of the contract.
    pub apis: Bytes,
    /// The transformed code as it is persisted for later invocations.
    pub code: Bytes,
}

/// Identifies the runtime setup of one loaded dapp. Sandbox frames are pushed and popped on
/// behalf of a setup, and a pop must name the setup of the frame on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("setup#{_0}")]
pub struct RuntimeSetupId(u64);

impl RuntimeSetupId {
    /// Allocates an identifier that is unique within this process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle of the class loader that owns a loaded dapp's classes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display, derive_more::From,
)]
#[display("loader#{_0}")]
pub struct ClassLoaderId(u64);

/// Identity of an interned class inside the sandbox.
pub type ClassId = u32;

/// The interned-class table of a loaded dapp, shared between the image and its sandbox frames.
#[derive(Debug, Clone, Default)]
pub struct InternedClasses(Arc<HashMap<String, ClassId>>);

impl InternedClasses {
    /// Looks up the identity of an interned class by name.
    pub fn get(&self, name: &str) -> Option<ClassId> {
        self.0.get(name).copied()
    }

    /// Number of interned classes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no class is interned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InternedClasses {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let table = iter.into_iter().zip(0..).map(|(name, id)| (name.into(), id)).collect();
        Self(Arc::new(table))
    }
}
