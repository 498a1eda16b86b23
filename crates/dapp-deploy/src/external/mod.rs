//! Collaborators of the deployment core.
//!
//! The code transformer, the dapp loader, the interpreter behind a loaded image and the world
//! state are implemented outside this crate. The traits here fix what the deployment driver
//! requires from each of them:
//!
//! - [`ExternalState`] - read the contract package and persist what the deployment produced
//! - [`CodeTransformer`] - rewrite an untrusted package into a sandboxed module
//! - [`DappLoader`] - turn a transformed module into a [`ContractImage`]
//! - [`ContractImage`] - run static initialization and the constructor, then serialize state

use core::fmt::Debug;

use alloy_primitives::Bytes;
use auto_impl::auto_impl;

use crate::{
    BlockchainRuntime, ClassLoaderId, DeployConfig, DeployError, InternedClasses, ObjectGraph,
    TransformedDapp,
};

/// The world state as seen by one deployment.
///
/// Implementations may be shared by deployments running on different threads and are expected
/// to provide their own isolation. All calls are synchronous from the caller's point of view.
#[auto_impl(&, Box, Arc)]
pub trait ExternalState: Debug {
    /// The raw contract package being deployed.
    fn code(&self) -> Option<Bytes>;

    /// Persists the transformed code of the dapp.
    fn set_transformed_code(&self, code: Bytes);

    /// Blocks until every asynchronous callback triggered by the execution so far has completed.
    fn wait_for_callbacks(&self);

    /// Persists the serialized object graph of the dapp.
    fn put_object_graph(&self, graph: ObjectGraph);
}

/// Rewrites a raw contract package into a sandboxed, loadable module.
#[auto_impl(&, Box, Arc)]
pub trait CodeTransformer {
    /// The transformed module handed to the loader.
    type Module;

    /// Transforms the package held by `state`.
    ///
    /// Malformed or unsafe input fails with
    /// [`SandboxException::Transformation`](crate::SandboxException::Transformation).
    fn transform<S: ExternalState>(
        &self,
        state: &S,
        config: &DeployConfig,
    ) -> Result<TransformedDapp<Self::Module>, DeployError>;
}

/// Loads a transformed module into an executable image.
#[auto_impl(&, Box, Arc)]
pub trait DappLoader {
    /// The transformed module this loader accepts.
    type Module;
    /// The loaded image.
    type Image: ContractImage;

    /// Loads `module`, keeping debug metadata if `preserve_debuggability` is set.
    fn load(
        &self,
        module: Self::Module,
        apis: &Bytes,
        preserve_debuggability: bool,
    ) -> Result<Self::Image, DeployError>;
}

/// A loaded, executable contract image.
///
/// Execution hooks are invoked inside an active sandbox frame; the interpreter bills computation
/// and assigns object identities through the [`sandbox`](crate::sandbox) hooks.
#[auto_impl(&mut, Box)]
pub trait ContractImage {
    /// Checks that every entry point the dapp declares is present and well formed.
    ///
    /// Failures are [`SandboxException::Validation`](crate::SandboxException::Validation).
    fn verify_methods(&self) -> Result<(), DeployError>;

    /// The class loader owning the image's classes.
    fn class_loader(&self) -> ClassLoaderId;

    /// The interned-class table of the image.
    fn interned_classes(&self) -> InternedClasses;

    /// Forces static initialization of every loaded class.
    fn initialize_classes(&mut self, runtime: &BlockchainRuntime) -> Result<(), DeployError>;

    /// Runs the entry constructor with the transaction's parameters.
    fn construct(&mut self, runtime: &BlockchainRuntime, params: &Bytes)
        -> Result<(), DeployError>;

    /// Serializes the entire reachable object graph, tagged with `next_hash_code`.
    ///
    /// Serializers should stop once the output would pass `max_size`.
    fn save_entire_graph(
        &mut self,
        next_hash_code: u32,
        max_size: usize,
    ) -> Result<ObjectGraph, DeployError>;
}
