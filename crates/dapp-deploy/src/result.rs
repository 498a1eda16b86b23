use serde::{Deserialize, Serialize};

use crate::constants;

/// Why a deployment failed, as reported to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCode {
    /// A failure without a more specific code.
    UnknownFailure,
    /// The target contract does not exist.
    ContractNotFound,
    /// A required entry point is missing.
    MethodNotFound,
    /// Value was sent to a method that does not accept it.
    MethodNotPayable,
    /// The contract package or its code is malformed.
    IllegalFormat,
    /// A parameter could not be decoded.
    InvalidParameter,
    /// The contract instance is not usable.
    InvalidInstance,
    /// A container was accessed outside its bounds.
    InvalidContainerAccess,
    /// The caller is not allowed to perform the operation.
    AccessDenied,
    /// The energy limit was exhausted.
    OutOfStep,
    /// The sender cannot pay for the operation.
    OutOfBalance,
    /// Execution took too long.
    Timeout,
    /// The sandbox call stack was exhausted.
    StackOverflow,
    /// The transaction must be skipped.
    SkipTransaction,
    /// The contract package could not be opened.
    PackageError,
    /// A reversion requested by the contract itself, relative to
    /// [`USER_REVERSION_START`](constants::USER_REVERSION_START).
    UserRevert(u32),
}

impl FailureCode {
    /// The numeric status code.
    pub const fn code(&self) -> u32 {
        match self {
            Self::UnknownFailure => 1,
            Self::ContractNotFound => 2,
            Self::MethodNotFound => 3,
            Self::MethodNotPayable => 4,
            Self::IllegalFormat => 5,
            Self::InvalidParameter => 6,
            Self::InvalidInstance => 7,
            Self::InvalidContainerAccess => 8,
            Self::AccessDenied => 9,
            Self::OutOfStep => 10,
            Self::OutOfBalance => 11,
            Self::Timeout => 12,
            Self::StackOverflow => 13,
            Self::SkipTransaction => 14,
            Self::PackageError => 15,
            Self::UserRevert(offset) => {
                let code = constants::USER_REVERSION_START.saturating_add(*offset);
                if code > constants::USER_REVERSION_END {
                    constants::USER_REVERSION_END
                } else {
                    code
                }
            }
        }
    }
}

/// The status of a finished deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The contract was deployed and its state persisted.
    Success,
    /// The deployment failed with the given code.
    Failure(FailureCode),
}

impl Status {
    /// The numeric status code. `0` for success.
    pub const fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::Failure(failure) => failure.code(),
        }
    }

    /// Returns `true` for [`Status::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The outcome of one deployment attempt. Produced exactly once per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    /// Success or the classified failure.
    pub status: Status,
    /// Energy billed to the sender.
    pub energy_used: u64,
    /// A human-readable reason, only present on failures that carry one.
    pub message: Option<String>,
}

impl DeploymentResult {
    /// A successful deployment that used `energy_used`.
    pub const fn success(energy_used: u64) -> Self {
        Self { status: Status::Success, energy_used, message: None }
    }

    /// A failed deployment.
    pub const fn failure(code: FailureCode, energy_used: u64, message: Option<String>) -> Self {
        Self { status: Status::Failure(code), energy_used, message }
    }

    /// Returns `true` if the deployment succeeded.
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The failure code, if the deployment failed.
    pub const fn failure_code(&self) -> Option<FailureCode> {
        match self.status {
            Status::Success => None,
            Status::Failure(code) => Some(code),
        }
    }
}
