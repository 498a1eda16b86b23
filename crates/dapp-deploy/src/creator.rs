//! Contract deployment driver.
//!
//! [`DappCreator::create`] runs one deployment attempt:
//! 1. Transforms the contract package held by the external state
//! 2. Loads the transformed module and verifies its methods
//! 3. Binds a [`BlockchainRuntime`] to the transaction and pushes a sandbox frame starting at
//!    object identity [`INITIAL_NEXT_HASH_CODE`](constants::INITIAL_NEXT_HASH_CODE)
//! 4. Persists the transformed code
//! 5. Runs static initialization and the constructor, then waits for outstanding callbacks
//! 6. Serializes the object graph, bills the sender for its size and persists it
//!
//! Recognized sandbox exceptions from any step become a failed [`DeploymentResult`]. The frame
//! pushed in step 3 is popped exactly once whatever happens afterwards, before an unclassified
//! fault or a panic leaves this module.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, trace, warn};

use crate::{
    classify, constants, sandbox, BlockchainRuntime, CodeTransformer, ContractImage, DappLoader,
    DeployConfig, DeployError, DeploymentResult, ExternalState, FrameContext, FrameGuard,
    LoadedDapp, Transaction, UnclassifiedFault,
};

/// Deploys contracts through a code transformer and a dapp loader.
#[derive(Debug, Clone, Default)]
pub struct DappCreator<T, L> {
    transformer: T,
    loader: L,
}

impl<T, L> DappCreator<T, L>
where
    T: CodeTransformer,
    L: DappLoader<Module = T::Module>,
{
    /// Creates a new [`DappCreator`].
    pub const fn new(transformer: T, loader: L) -> Self {
        Self { transformer, loader }
    }

    /// Deploys the contract package held by `state` to `dapp_address`.
    ///
    /// Returns the classified outcome of the attempt. Faults outside the sandbox exception family
    /// are returned as `Err` once the sandbox frame has been released.
    pub fn create<S: ExternalState>(
        &self,
        state: &S,
        sender: Address,
        dapp_address: Address,
        tx: &Transaction,
        config: &DeployConfig,
    ) -> Result<DeploymentResult, UnclassifiedFault> {
        let mut frame = None;
        let outcome = self.try_create(state, sender, dapp_address, tx, config, &mut frame);
        let result = match outcome {
            Ok(result) => Ok(result),
            Err(DeployError::Sandbox(exception)) => {
                if config.enable_verbose_contract_errors {
                    warn!(
                        target: "dapp_deploy::creator",
                        %dapp_address,
                        error = %exception,
                        "DApp deployment failed"
                    );
                }
                let ledger = frame.as_ref().and_then(FrameGuard::energy_snapshot);
                Ok(classify(&exception, ledger))
            }
            Err(DeployError::Unclassified(fault)) => Err(fault),
        };
        // Detach this thread from the dapp no matter how the attempt ended.
        drop(frame);
        result
    }

    fn try_create<S: ExternalState>(
        &self,
        state: &S,
        sender: Address,
        dapp_address: Address,
        tx: &Transaction,
        config: &DeployConfig,
        frame: &mut Option<FrameGuard>,
    ) -> Result<DeploymentResult, DeployError> {
        let transformed = self.transformer.transform(state, config)?;
        let image =
            self.loader.load(transformed.module, &transformed.apis, config.preserve_debuggability)?;
        let mut dapp = LoadedDapp::new(image);
        dapp.verify_methods()?;
        trace!(
            target: "dapp_deploy::creator",
            %dapp_address,
            setup = %dapp.runtime_setup(),
            "loaded dapp"
        );

        // No object has been created by this dapp yet.
        let next_hash_code = constants::INITIAL_NEXT_HASH_CODE;
        let runtime = Arc::new(BlockchainRuntime::new(
            sender,
            dapp_address,
            tx.clone(),
            dapp.runtime_setup(),
            config.enable_context_println,
        ));
        let guard = frame.insert(sandbox::push_frame(
            dapp.runtime_setup(),
            dapp.class_loader(),
            tx.energy_limit,
            next_hash_code,
            dapp.interned_classes(),
            FrameContext::new(sender, dapp_address),
        ));
        let previous = dapp.attach_blockchain_runtime(runtime);
        assert!(previous.is_none(), "freshly loaded dapp already had a runtime attached");

        state.set_transformed_code(transformed.code);

        run_clinit_and_bill_sender(&mut dapp, guard, state, tx, config)
    }
}

/// Runs static initialization and the constructor, then bills the sender for the object graph
/// and persists it.
fn run_clinit_and_bill_sender<I: ContractImage, S: ExternalState>(
    dapp: &mut LoadedDapp<I>,
    frame: &FrameGuard,
    state: &S,
    tx: &Transaction,
    config: &DeployConfig,
) -> Result<DeploymentResult, DeployError> {
    {
        let _callbacks = CallbackBarrier(state);
        dapp.force_initialize_all_classes()?;
        dapp.init_main_instance(&tx.params)?;
    }

    let graph = dapp.save_entire_graph(frame.peek_next_hash_code()?, config.graph_size_bound())?;
    let write_cost = config.graph_write_cost(graph.len());
    debug!(
        target: "dapp_deploy::creator",
        size = graph.len(),
        write_cost,
        next_hash_code = graph.next_hash_code,
        "billing object graph"
    );
    frame.charge_energy(write_cost)?;
    state.put_object_graph(graph);

    let energy_used = frame.energy_snapshot().ok_or(UnclassifiedFault::NoActiveFrame)?.used;
    Ok(DeploymentResult::success(energy_used))
}

/// Waits for outstanding external-state callbacks when dropped, including while unwinding.
struct CallbackBarrier<'a, S: ExternalState>(&'a S);

impl<S: ExternalState> Drop for CallbackBarrier<'_, S> {
    fn drop(&mut self) {
        self.0.wait_for_callbacks();
    }
}
