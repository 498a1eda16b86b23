//! Test utilities for the deployment pipeline.

mod scripted;
mod state;

pub use scripted::*;
pub use state::*;
