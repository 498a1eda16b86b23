use core::{cell::RefCell, marker::PhantomData};

use tracing::{error, trace};

use super::{FrameContext, SandboxFrame};
use crate::{
    ClassLoaderId, DeployError, EnergySnapshot, InternedClasses, RuntimeSetupId, UnclassifiedFault,
};

thread_local! {
    static FRAME_STACK: RefCell<Vec<SandboxFrame>> = const { RefCell::new(Vec::new()) };
}

/// A violation of the frame stack's LIFO discipline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameStackError {
    /// There is no frame to pop.
    #[error("no sandbox frame to pop for {setup}")]
    Empty {
        /// The setup that asked for the pop
        setup: RuntimeSetupId,
    },
    /// The top frame belongs to a different setup.
    #[error("top sandbox frame belongs to {found}, not {expected}")]
    Mismatch {
        /// The setup that asked for the pop
        expected: RuntimeSetupId,
        /// The setup owning the top frame
        found: RuntimeSetupId,
    },
}

/// Pushes a new frame onto the calling thread's stack.
///
/// The frame is popped when the returned guard is dropped.
pub fn push_frame(
    setup: RuntimeSetupId,
    class_loader: ClassLoaderId,
    energy_limit: u64,
    next_hash_code: u32,
    interned: InternedClasses,
    context: FrameContext,
) -> FrameGuard {
    let frame =
        SandboxFrame::new(setup, class_loader, energy_limit, next_hash_code, interned, context);
    let index = FRAME_STACK.with_borrow_mut(|stack| {
        stack.push(frame);
        stack.len() - 1
    });
    trace!(target: "dapp_deploy::sandbox", %setup, depth = index + 1, energy_limit, "pushed frame");
    FrameGuard { setup, index, _not_send: PhantomData }
}

/// Pops the top frame of the calling thread's stack on behalf of `setup`.
///
/// # Panics
///
/// Panics if the stack is empty or its top frame belongs to another setup.
pub fn pop_frame(setup: RuntimeSetupId) -> SandboxFrame {
    match try_pop_frame(setup) {
        Ok(frame) => frame,
        Err(err) => panic!("sandbox frame stack corrupted: {err}"),
    }
}

/// Pops the top frame of the calling thread's stack on behalf of `setup`, leaving the stack
/// untouched if the top frame is not owned by `setup`.
pub fn try_pop_frame(setup: RuntimeSetupId) -> Result<SandboxFrame, FrameStackError> {
    FRAME_STACK.with_borrow_mut(|stack| {
        let found = stack.last().map(|top| top.setup).ok_or(FrameStackError::Empty { setup })?;
        if found != setup {
            return Err(FrameStackError::Mismatch { expected: setup, found });
        }
        let frame = stack.pop().ok_or(FrameStackError::Empty { setup })?;
        trace!(target: "dapp_deploy::sandbox", %setup, depth = stack.len(), "popped frame");
        Ok(frame)
    })
}

/// Number of active frames on the calling thread.
pub fn frame_depth() -> usize {
    FRAME_STACK.with_borrow(Vec::len)
}

/// Runs `f` against the top frame of the calling thread.
///
/// The stack stays borrowed while `f` runs, so `f` must not call back into the sandbox hooks.
pub(crate) fn with_top_frame<R>(f: impl FnOnce(&mut SandboxFrame) -> R) -> Result<R, DeployError> {
    FRAME_STACK
        .with_borrow_mut(|stack| stack.last_mut().map(f))
        .ok_or_else(|| UnclassifiedFault::NoActiveFrame.into())
}

/// Scoped ownership of one pushed frame.
///
/// Dropping the guard pops the frame. The guard is bound to the thread that pushed it.
#[must_use = "dropping the guard pops the frame immediately"]
#[derive(Debug)]
pub struct FrameGuard {
    setup: RuntimeSetupId,
    /// Position of the guarded frame in the stack.
    index: usize,
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    /// The setup owning the guarded frame.
    pub const fn setup(&self) -> RuntimeSetupId {
        self.setup
    }

    /// Runs `f` against the guarded frame.
    ///
    /// Frames pushed above it (nested deployments) are not visible through the guard.
    fn with_frame<R>(&self, f: impl FnOnce(&mut SandboxFrame) -> R) -> Result<R, DeployError> {
        FRAME_STACK
            .with_borrow_mut(|stack| {
                stack.get_mut(self.index).filter(|frame| frame.setup == self.setup).map(f)
            })
            .ok_or_else(|| UnclassifiedFault::NoActiveFrame.into())
    }

    /// A snapshot of the guarded frame's energy ledger.
    pub fn energy_snapshot(&self) -> Option<EnergySnapshot> {
        self.with_frame(|frame| frame.energy_snapshot()).ok()
    }

    /// Charges the guarded frame's energy ledger.
    pub fn charge_energy(&self, amount: u64) -> Result<(), DeployError> {
        self.with_frame(|frame| frame.meter.charge(amount))??;
        Ok(())
    }

    /// The next object identity of the guarded frame.
    pub fn peek_next_hash_code(&self) -> Result<u32, DeployError> {
        self.with_frame(|frame| frame.peek_next_hash_code())
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            // a second panic would abort the process
            if let Err(err) = try_pop_frame(self.setup) {
                error!(target: "dapp_deploy::sandbox", %err, "failed to pop frame while unwinding");
            }
            return;
        }
        pop_frame(self.setup);
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    fn push(energy_limit: u64) -> FrameGuard {
        push_frame(
            RuntimeSetupId::next(),
            ClassLoaderId::default(),
            energy_limit,
            1,
            InternedClasses::default(),
            FrameContext::new(Address::ZERO, Address::ZERO),
        )
    }

    #[test]
    fn test_guard_pops_on_drop() {
        assert_eq!(frame_depth(), 0);
        let guard = push(10);
        assert_eq!(frame_depth(), 1);
        drop(guard);
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_nested_guards_are_lifo() {
        let outer = push(100);
        let inner = push(10);
        assert_eq!(frame_depth(), 2);

        inner.charge_energy(4).unwrap();
        outer.charge_energy(7).unwrap();
        assert_eq!(inner.energy_snapshot().unwrap().used, 4);
        assert_eq!(outer.energy_snapshot().unwrap().used, 7);

        drop(inner);
        assert_eq!(frame_depth(), 1);
        drop(outer);
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_try_pop_rejects_foreign_setup() {
        let guard = push(10);
        let err = try_pop_frame(RuntimeSetupId::next()).unwrap_err();
        assert!(matches!(err, FrameStackError::Mismatch { found, .. } if found == guard.setup()));
        assert_eq!(frame_depth(), 1);
        drop(guard);
    }

    #[test]
    #[should_panic(expected = "sandbox frame stack corrupted")]
    fn test_pop_without_frame_panics() {
        pop_frame(RuntimeSetupId::next());
    }

    #[test]
    fn test_guard_pops_during_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = push(10);
            panic!("constructor blew up");
        });
        assert!(result.is_err());
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_frames_are_thread_local() {
        let _guard = push(10);
        let depth_elsewhere = std::thread::spawn(frame_depth).join().unwrap();
        assert_eq!(depth_elsewhere, 0);
        assert_eq!(frame_depth(), 1);
    }
}
