//! Hooks for the interpreter running inside the top sandbox frame.
//!
//! Computation is billed by the interpreter through [`charge_energy`]; the deployment driver only
//! observes the result through the frame's ledger. Every hook fails with
//! [`UnclassifiedFault::NoActiveFrame`](crate::UnclassifiedFault::NoActiveFrame) when the calling
//! thread has no frame.
//!
//! The frame stack is only borrowed for the duration of a hook and never while caller code runs,
//! so hooks may be freely nested inside one another.

use super::{stack::with_top_frame, FrameContext};
use crate::{ClassId, DeployError};

/// Charges `cost` against the top frame's energy ledger.
pub fn charge_energy(cost: u64) -> Result<(), DeployError> {
    with_top_frame(|frame| frame.meter.charge(cost))??;
    Ok(())
}

/// Energy left in the top frame, or `None` without an active frame.
pub fn energy_left() -> Option<u64> {
    with_top_frame(|frame| frame.meter.remaining()).ok()
}

/// The next object identity of the top frame, or `None` without an active frame.
pub fn peek_next_hash_code() -> Option<u32> {
    with_top_frame(|frame| frame.peek_next_hash_code()).ok()
}

/// Assigns the next object identity of the top frame.
pub fn next_hash_code() -> Result<u32, DeployError> {
    with_top_frame(|frame| frame.next_hash_code())
}

/// Records entry into a sandboxed method.
///
/// Fails with [`SandboxException::OutOfStack`](crate::SandboxException::OutOfStack) once the
/// nesting exceeds [`MAX_STACK_DEPTH`](crate::constants::MAX_STACK_DEPTH).
pub fn enter_method() -> Result<(), DeployError> {
    with_top_frame(|frame| frame.enter_method())??;
    Ok(())
}

/// Records return from a sandboxed method.
pub fn exit_method() -> Result<(), DeployError> {
    with_top_frame(|frame| frame.exit_method())
}

/// Looks up an interned class of the executing dapp.
pub fn interned_class(name: &str) -> Result<Option<ClassId>, DeployError> {
    with_top_frame(|frame| frame.interned.get(name))
}

/// A copy of the top frame's execution context.
pub fn frame_context() -> Result<FrameContext, DeployError> {
    with_top_frame(|frame| frame.context.clone())
}

/// Counts one line of contract output against the top frame, returning the new total.
pub(crate) fn record_println() -> Result<u64, DeployError> {
    with_top_frame(|frame| {
        frame.context.printed_lines += 1;
        frame.context.printed_lines
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::{
        constants, sandbox::push_frame, ClassLoaderId, InternedClasses, RuntimeSetupId,
        SandboxException, UnclassifiedFault,
    };

    fn push(energy_limit: u64) -> crate::FrameGuard {
        push_frame(
            RuntimeSetupId::next(),
            ClassLoaderId::from(7),
            energy_limit,
            constants::INITIAL_NEXT_HASH_CODE,
            ["Main", "Main$Inner"].into_iter().collect(),
            FrameContext::new(Address::ZERO, Address::repeat_byte(0x11)),
        )
    }

    #[test]
    fn test_hooks_without_frame() {
        assert!(energy_left().is_none());
        assert!(peek_next_hash_code().is_none());
        assert!(matches!(
            charge_energy(1),
            Err(DeployError::Unclassified(UnclassifiedFault::NoActiveFrame))
        ));
    }

    #[test]
    fn test_charge_energy_hits_top_frame() {
        let outer = push(1_000);
        let inner = push(50);
        charge_energy(20).unwrap();
        assert_eq!(energy_left(), Some(30));
        drop(inner);
        assert_eq!(energy_left(), Some(1_000));
        drop(outer);
    }

    #[test]
    fn test_next_hash_code_advances_watermark() {
        let _guard = push(10);
        assert_eq!(next_hash_code().unwrap(), 1);
        assert_eq!(next_hash_code().unwrap(), 2);
        assert_eq!(peek_next_hash_code(), Some(3));
    }

    #[test]
    fn test_stack_depth_is_bounded() {
        let _guard = push(10);
        for _ in 0..constants::MAX_STACK_DEPTH {
            enter_method().unwrap();
        }
        let err = enter_method().unwrap_err();
        assert!(matches!(
            err.as_sandbox(),
            Some(SandboxException::OutOfStack { depth, limit })
                if *depth == constants::MAX_STACK_DEPTH + 1 && *limit == constants::MAX_STACK_DEPTH
        ));
        exit_method().unwrap();
        enter_method().unwrap();
    }

    #[test]
    fn test_frame_context_and_interned_classes() {
        let _guard = push(10);
        assert_eq!(interned_class("Main$Inner").unwrap(), Some(1));
        assert_eq!(interned_class("Missing").unwrap(), None);
        assert_eq!(record_println().unwrap(), 1);
        let context = frame_context().unwrap();
        assert_eq!(context.address, Address::repeat_byte(0x11));
        assert_eq!(context.printed_lines, 1);
    }

    #[test]
    fn test_hooks_nest_without_reborrowing_the_stack() {
        let _guard = push(100);
        let script = || -> Result<u64, DeployError> {
            charge_energy(energy_left().unwrap_or_default() / 2)?;
            let identity = next_hash_code()?;
            enter_method()?;
            let printed = record_println()?;
            exit_method()?;
            Ok(u64::from(identity) + printed + frame_context()?.printed_lines)
        };
        assert_eq!(script().unwrap(), 1 + 1 + 1);
        assert_eq!(script().unwrap(), 2 + 2 + 2);
        assert_eq!(energy_left(), Some(25));
    }
}
