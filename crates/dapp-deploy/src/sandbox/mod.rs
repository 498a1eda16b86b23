//! The sandbox frame stack.
//!
//! Sandboxed code always runs inside a [`SandboxFrame`] on the calling thread. A frame carries
//! the energy ledger, the object-identity watermark, the interned-class table and a frame-local
//! [`FrameContext`] of one dapp execution. Frames live on a thread-local stack: a contract that
//! deploys another contract pushes a second frame on the same thread, and frames of different
//! threads never interleave.
//!
//! # Guarantees
//!
//! - [`push_frame`] never fails. It returns a [`FrameGuard`] that pops the frame exactly once when
//!   dropped, on every exit path including early returns and unwinding panics.
//! - [`pop_frame`] enforces strict LIFO order. Popping with no frame, or on behalf of a setup that
//!   does not own the top frame, is a logic error and panics.
//!
//! # Module Structure
//!
//! - `frame` - [`SandboxFrame`] and [`FrameContext`]
//! - `stack` - the thread-local stack, [`push_frame`], [`pop_frame`] and [`FrameGuard`]
//! - `instrumentation` - hooks the interpreter calls while running inside the top frame

mod frame;
mod instrumentation;
mod stack;

pub use frame::*;
pub use instrumentation::*;
pub use stack::*;
