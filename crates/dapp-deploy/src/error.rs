//! Error types for deployment.
//!
//! Failures split into two families. [`SandboxException`] is the closed set the deployment core
//! knows how to turn into a [`DeploymentResult`](crate::DeploymentResult). Everything else is an
//! [`UnclassifiedFault`]: a defect in the host or a collaborator that is handed back to the caller
//! after the sandbox frame has been released.

use crate::FailureCode;

/// The recognized family of sandbox failures. Each one carries its own status code and message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxException {
    /// The contract package was rejected by the code transformer.
    #[error("transformation failed: {message}")]
    Transformation {
        /// The status code reported for the rejection
        code: FailureCode,
        /// What was wrong with the package
        message: String,
    },
    /// The loaded image failed method verification.
    #[error("validation failed: {message}")]
    Validation {
        /// The status code reported for the rejection
        code: FailureCode,
        /// What was wrong with the image
        message: String,
    },
    /// A charge would have exceeded the energy limit.
    #[error("out of energy: requested {requested} with {remaining} of {limit} remaining")]
    OutOfEnergy {
        /// The energy limit of the frame
        limit: u64,
        /// The amount that could not be charged
        requested: u64,
        /// The energy left before the failed charge
        remaining: u64,
    },
    /// Nested method invocations exceeded the sandbox stack.
    #[error("sandbox stack depth {depth} exceeds limit {limit}")]
    OutOfStack {
        /// The depth that was attempted
        depth: u32,
        /// The maximum depth
        limit: u32,
    },
    /// The serialized object graph is larger than allowed.
    #[error("object graph of {size} bytes exceeds maximum of {max} bytes")]
    GraphTooLarge {
        /// The size of the serialized graph
        size: usize,
        /// The configured maximum
        max: usize,
    },
    /// A contract-requested reversion.
    #[error("reverted with code {code}")]
    Revert {
        /// Offset from the first user reversion code
        code: u32,
        /// Optional reason given by the contract
        message: Option<String>,
    },
    /// Any other predefined sandbox fault with an explicit status code.
    #[error("{code:?}")]
    Predefined {
        /// The status code of the fault
        code: FailureCode,
        /// Optional reason
        message: Option<String>,
    },
}

impl SandboxException {
    /// The status code this exception is reported with.
    pub const fn code(&self) -> FailureCode {
        match self {
            Self::Transformation { code, .. } |
            Self::Validation { code, .. } |
            Self::Predefined { code, .. } => *code,
            Self::OutOfEnergy { .. } => FailureCode::OutOfStep,
            Self::OutOfStack { .. } => FailureCode::StackOverflow,
            Self::GraphTooLarge { .. } => FailureCode::UnknownFailure,
            Self::Revert { code, .. } => FailureCode::UserRevert(*code),
        }
    }

    /// The message reported to the sender alongside the status code.
    pub fn result_message(&self) -> Option<String> {
        match self {
            Self::Transformation { message, .. } | Self::Validation { message, .. } => {
                Some(message.clone())
            }
            Self::Revert { message, .. } | Self::Predefined { message, .. } => message.clone(),
            Self::OutOfEnergy { .. } | Self::OutOfStack { .. } | Self::GraphTooLarge { .. } => {
                Some(self.to_string())
            }
        }
    }
}

/// A failure outside the recognized sandbox family. Never converted into a result.
#[derive(Debug, thiserror::Error)]
pub enum UnclassifiedFault {
    /// A sandbox hook was used on a thread with no active frame.
    #[error("no active sandbox frame on this thread")]
    NoActiveFrame,
    /// The dapp was asked to run without a blockchain runtime attached.
    #[error("no blockchain runtime attached to the dapp")]
    NoRuntimeAttached,
    /// Any other defect raised by a collaborator.
    #[error(transparent)]
    Other(Box<dyn core::error::Error + Send + Sync>),
}

impl UnclassifiedFault {
    /// Wraps an arbitrary error or message.
    pub fn other(error: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }
}

/// Any failure during a deployment attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A recognized sandbox exception.
    #[error(transparent)]
    Sandbox(#[from] SandboxException),
    /// A defect that propagates to the caller.
    #[error(transparent)]
    Unclassified(#[from] UnclassifiedFault),
}

impl DeployError {
    /// Returns the sandbox exception, if this error is one.
    pub const fn as_sandbox(&self) -> Option<&SandboxException> {
        match self {
            Self::Sandbox(exception) => Some(exception),
            Self::Unclassified(_) => None,
        }
    }
}
