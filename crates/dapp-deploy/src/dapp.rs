use std::sync::Arc;

use alloy_primitives::Bytes;
use delegate::delegate;

use crate::{
    BlockchainRuntime, ClassLoaderId, ContractImage, DeployError, InternedClasses, ObjectGraph,
    RuntimeSetupId, SandboxException, UnclassifiedFault,
};

/// A verified, loaded dapp together with the runtime currently attached to it.
///
/// At most one [`BlockchainRuntime`] is attached at any time.
#[derive(Debug)]
pub struct LoadedDapp<I> {
    image: I,
    setup: RuntimeSetupId,
    runtime: Option<Arc<BlockchainRuntime>>,
}

impl<I: ContractImage> LoadedDapp<I> {
    /// Wraps a freshly loaded image. No runtime is attached yet.
    pub fn new(image: I) -> Self {
        Self { image, setup: RuntimeSetupId::next(), runtime: None }
    }

    /// The runtime setup frames of this dapp are pushed under.
    pub const fn runtime_setup(&self) -> RuntimeSetupId {
        self.setup
    }

    /// The loaded image.
    pub const fn image(&self) -> &I {
        &self.image
    }

    delegate! {
        to self.image {
            /// Checks the image's entry points.
            pub fn verify_methods(&self) -> Result<(), DeployError>;
            /// The class loader owning the image's classes.
            pub fn class_loader(&self) -> ClassLoaderId;
            /// The interned-class table of the image.
            pub fn interned_classes(&self) -> InternedClasses;
        }
    }

    /// Attaches `runtime`, returning the runtime that was attached before, if any.
    pub fn attach_blockchain_runtime(
        &mut self,
        runtime: Arc<BlockchainRuntime>,
    ) -> Option<Arc<BlockchainRuntime>> {
        self.runtime.replace(runtime)
    }

    /// Detaches and returns the attached runtime.
    pub fn detach_blockchain_runtime(&mut self) -> Option<Arc<BlockchainRuntime>> {
        self.runtime.take()
    }

    /// The attached runtime.
    pub const fn blockchain_runtime(&self) -> Option<&Arc<BlockchainRuntime>> {
        self.runtime.as_ref()
    }

    fn attached_runtime(&self) -> Result<Arc<BlockchainRuntime>, UnclassifiedFault> {
        self.runtime.clone().ok_or(UnclassifiedFault::NoRuntimeAttached)
    }

    /// Runs static initialization of every class against the attached runtime.
    pub fn force_initialize_all_classes(&mut self) -> Result<(), DeployError> {
        let runtime = self.attached_runtime()?;
        self.image.initialize_classes(&runtime)
    }

    /// Runs the entry constructor with `params` against the attached runtime.
    pub fn init_main_instance(&mut self, params: &Bytes) -> Result<(), DeployError> {
        let runtime = self.attached_runtime()?;
        self.image.construct(&runtime, params)
    }

    /// Serializes the dapp's object graph, failing if it is larger than `max_size`.
    pub fn save_entire_graph(
        &mut self,
        next_hash_code: u32,
        max_size: usize,
    ) -> Result<ObjectGraph, DeployError> {
        let graph = self.image.save_entire_graph(next_hash_code, max_size)?;
        if graph.len() > max_size {
            return Err(SandboxException::GraphTooLarge { size: graph.len(), max: max_size }.into());
        }
        Ok(graph)
    }
}
