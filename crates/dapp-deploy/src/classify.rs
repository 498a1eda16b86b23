use crate::{DeploymentResult, EnergySnapshot, SandboxException};

/// Turns a recognized sandbox exception into the failed [`DeploymentResult`] of an attempt.
///
/// The status code and message are taken from the exception unchanged. `ledger` is the energy
/// ledger of the attempt's sandbox frame, or `None` if the attempt failed before the frame was
/// pushed, in which case nothing is billed.
pub fn classify(exception: &SandboxException, ledger: Option<EnergySnapshot>) -> DeploymentResult {
    let energy_used = ledger.map_or(0, |ledger| ledger.used);
    DeploymentResult::failure(exception.code(), energy_used, exception.result_message())
}
