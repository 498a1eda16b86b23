use alloy_primitives::Address;

use crate::{
    constants, ClassLoaderId, EnergyMeter, EnergySnapshot, InternedClasses, RuntimeSetupId,
    SandboxException,
};

/// Execution context local to one sandbox frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    /// The account that sent the transaction.
    pub sender: Address,
    /// The dapp executing in this frame.
    pub address: Address,
    /// Lines the contract printed while this frame was active.
    pub printed_lines: u64,
}

impl FrameContext {
    /// Creates a fresh context for `address`, called by `sender`.
    pub const fn new(sender: Address, address: Address) -> Self {
        Self { sender, address, printed_lines: 0 }
    }
}

/// One entry of the sandbox frame stack.
#[derive(Debug)]
pub struct SandboxFrame {
    /// The runtime setup that pushed this frame and must pop it.
    pub(crate) setup: RuntimeSetupId,
    /// The class loader of the executing dapp.
    pub(crate) class_loader: ClassLoaderId,
    /// The energy ledger of the frame.
    pub(crate) meter: EnergyMeter,
    /// The next object identity to hand out.
    pub(crate) next_hash_code: u32,
    /// Current depth of nested method invocations.
    pub(crate) stack_depth: u32,
    /// The interned-class table of the executing dapp.
    pub(crate) interned: InternedClasses,
    /// Frame-local execution context.
    pub(crate) context: FrameContext,
}

impl SandboxFrame {
    pub(crate) fn new(
        setup: RuntimeSetupId,
        class_loader: ClassLoaderId,
        energy_limit: u64,
        next_hash_code: u32,
        interned: InternedClasses,
        context: FrameContext,
    ) -> Self {
        Self {
            setup,
            class_loader,
            meter: EnergyMeter::new(energy_limit),
            next_hash_code,
            stack_depth: 0,
            interned,
            context,
        }
    }

    /// The runtime setup that owns this frame.
    pub const fn setup(&self) -> RuntimeSetupId {
        self.setup
    }

    /// The class loader of the executing dapp.
    pub const fn class_loader(&self) -> ClassLoaderId {
        self.class_loader
    }

    /// The energy ledger of this frame.
    pub const fn meter(&self) -> &EnergyMeter {
        &self.meter
    }

    /// A snapshot of the energy ledger.
    pub const fn energy_snapshot(&self) -> EnergySnapshot {
        self.meter.snapshot()
    }

    /// The next object identity that would be handed out.
    pub const fn peek_next_hash_code(&self) -> u32 {
        self.next_hash_code
    }

    /// The interned-class table of the executing dapp.
    pub const fn interned_classes(&self) -> &InternedClasses {
        &self.interned
    }

    /// The frame-local execution context.
    pub const fn context(&self) -> &FrameContext {
        &self.context
    }

    /// Hands out the next object identity.
    pub(crate) fn next_hash_code(&mut self) -> u32 {
        let hash_code = self.next_hash_code;
        self.next_hash_code = self.next_hash_code.wrapping_add(1);
        hash_code
    }

    /// Records entry into a method, failing once the sandbox stack is exhausted.
    pub(crate) fn enter_method(&mut self) -> Result<(), SandboxException> {
        let depth = self.stack_depth + 1;
        if depth > constants::MAX_STACK_DEPTH {
            return Err(SandboxException::OutOfStack { depth, limit: constants::MAX_STACK_DEPTH });
        }
        self.stack_depth = depth;
        Ok(())
    }

    /// Records return from a method.
    pub(crate) fn exit_method(&mut self) {
        self.stack_depth = self.stack_depth.saturating_sub(1);
    }
}
