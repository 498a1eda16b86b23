use alloy_primitives::{Address, Bytes};
use tracing::info;

use crate::{sandbox, RuntimeSetupId, Transaction};

/// The host-facing runtime a dapp talks to while it executes.
///
/// One runtime is bound to a single transaction and dapp address, and is attached to the
/// [`LoadedDapp`](crate::LoadedDapp) for the duration of the execution.
#[derive(Debug)]
pub struct BlockchainRuntime {
    sender: Address,
    address: Address,
    transaction: Transaction,
    setup: RuntimeSetupId,
    enable_context_println: bool,
}

impl BlockchainRuntime {
    /// Creates a runtime for `transaction`, sent by `sender` to deploy `address`.
    pub const fn new(
        sender: Address,
        address: Address,
        transaction: Transaction,
        setup: RuntimeSetupId,
        enable_context_println: bool,
    ) -> Self {
        Self { sender, address, transaction, setup, enable_context_println }
    }

    /// The account that sent the transaction.
    pub const fn caller(&self) -> Address {
        self.sender
    }

    /// The address of the executing dapp.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The runtime setup of the dapp this runtime serves.
    pub const fn setup(&self) -> RuntimeSetupId {
        self.setup
    }

    /// The energy limit of the transaction.
    pub const fn energy_limit(&self) -> u64 {
        self.transaction.energy_limit
    }

    /// The constructor or call parameters of the transaction.
    pub const fn params(&self) -> &Bytes {
        &self.transaction.params
    }

    /// Energy left in the active sandbox frame.
    pub fn energy_left(&self) -> Option<u64> {
        sandbox::energy_left()
    }

    /// Prints a diagnostic line on behalf of the contract.
    ///
    /// Returns `false` and drops the line when contract output is disabled or no sandbox frame is
    /// active on the calling thread.
    pub fn println(&self, message: &str) -> bool {
        if !self.enable_context_println {
            return false;
        }
        let Ok(line) = sandbox::record_println() else {
            return false;
        };
        info!(target: "dapp_deploy::println", address = %self.address, line, "{message}");
        true
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::bytes;

    use super::*;
    use crate::{ClassLoaderId, FrameContext, InternedClasses};

    fn runtime(enable_context_println: bool) -> BlockchainRuntime {
        BlockchainRuntime::new(
            Address::repeat_byte(0xaa),
            Address::repeat_byte(0xbb),
            Transaction::new(500, bytes!("c0ffee"), Address::repeat_byte(0xbb)),
            RuntimeSetupId::next(),
            enable_context_println,
        )
    }

    #[test]
    fn test_exposes_transaction() {
        let runtime = runtime(false);
        assert_eq!(runtime.caller(), Address::repeat_byte(0xaa));
        assert_eq!(runtime.address(), Address::repeat_byte(0xbb));
        assert_eq!(runtime.energy_limit(), 500);
        assert_eq!(runtime.params(), &bytes!("c0ffee"));
        assert_eq!(runtime.energy_left(), None);
    }

    #[test]
    fn test_println_respects_flag() {
        let _guard = sandbox::push_frame(
            RuntimeSetupId::next(),
            ClassLoaderId::default(),
            500,
            1,
            InternedClasses::default(),
            FrameContext::new(Address::repeat_byte(0xaa), Address::repeat_byte(0xbb)),
        );
        assert!(!runtime(false).println("hidden"));
        assert!(runtime(true).println("shown"));
        assert_eq!(sandbox::frame_context().unwrap().printed_lines, 1);
    }

    #[test]
    fn test_println_without_frame_is_dropped() {
        assert!(!runtime(true).println("nowhere to go"));
    }
}
