//! Metered, sandboxed contract deployment.
//!
//! [`DappCreator`] drives one deployment attempt end to end: it transforms the raw contract
//! package, loads and verifies the resulting image, enters the sandbox by pushing a frame onto
//! the calling thread's frame stack, runs static initialization and the constructor, bills the
//! sender for the persisted object graph and finally leaves the sandbox again. Failures raised by
//! the sandbox are classified into a [`DeploymentResult`]; anything outside that family is handed
//! back to the caller once the frame has been popped.
//!
//! The transformer, loader, interpreter and persistence layer are collaborators described by the
//! traits in the `external` module.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod classify;
pub use classify::*;

mod config;
pub use config::*;

mod creator;
pub use creator::*;

mod dapp;
pub use dapp::*;

mod energy;
pub use energy::*;

mod error;
pub use error::*;

mod external;
pub use external::*;

mod result;
pub use result::*;

mod runtime;
pub use runtime::*;

pub mod sandbox;
pub use sandbox::{frame_depth, pop_frame, push_frame, FrameContext, FrameGuard, SandboxFrame};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;
