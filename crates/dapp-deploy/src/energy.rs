use serde::{Deserialize, Serialize};

use crate::SandboxException;

/// The energy ledger of one sandbox frame.
///
/// Consumption only grows and never passes the limit: a charge that does not fit spends whatever
/// is left and fails with [`SandboxException::OutOfEnergy`], which ends the attempt.
///
/// Serialized as its [`EnergySnapshot`]; deserializing a snapshot that consumed more than its
/// limit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EnergySnapshot", try_from = "EnergySnapshot")]
pub struct EnergyMeter {
    /// The energy limit.
    limit: u64,
    /// The energy consumed so far.
    consumed: u64,
}

impl EnergyMeter {
    /// Creates a ledger with nothing consumed.
    pub const fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    /// The energy limit.
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// The energy consumed so far.
    pub const fn used(&self) -> u64 {
        self.consumed
    }

    /// The energy still available.
    pub const fn remaining(&self) -> u64 {
        self.limit - self.consumed
    }

    /// Charges `amount`, failing if it would exceed the limit.
    pub fn charge(&mut self, amount: u64) -> Result<(), SandboxException> {
        match self.consumed.checked_add(amount) {
            Some(consumed) if consumed <= self.limit => {
                self.consumed = consumed;
                Ok(())
            }
            _ => {
                let remaining = self.remaining();
                self.spend_all();
                Err(SandboxException::OutOfEnergy {
                    limit: self.limit,
                    requested: amount,
                    remaining,
                })
            }
        }
    }

    /// Consumes everything that is left.
    pub fn spend_all(&mut self) {
        self.consumed = self.limit;
    }

    /// A copy of the current state of the ledger.
    pub const fn snapshot(&self) -> EnergySnapshot {
        EnergySnapshot { limit: self.limit, used: self.consumed }
    }
}

impl From<EnergyMeter> for EnergySnapshot {
    fn from(meter: EnergyMeter) -> Self {
        meter.snapshot()
    }
}

impl TryFrom<EnergySnapshot> for EnergyMeter {
    type Error = LedgerOverdrawn;

    fn try_from(snapshot: EnergySnapshot) -> Result<Self, Self::Error> {
        if snapshot.used > snapshot.limit {
            return Err(LedgerOverdrawn { limit: snapshot.limit, used: snapshot.used });
        }
        Ok(Self { limit: snapshot.limit, consumed: snapshot.used })
    }
}

/// An energy ledger state whose consumption exceeds its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("energy used {used} exceeds limit {limit}")]
pub struct LedgerOverdrawn {
    /// The energy limit
    pub limit: u64,
    /// The energy consumed
    pub used: u64,
}

/// A point-in-time view of an [`EnergyMeter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnergySnapshot {
    /// The energy limit.
    pub limit: u64,
    /// The energy consumed.
    pub used: u64,
}

impl EnergySnapshot {
    /// The energy that was still available.
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_accumulates() {
        let mut meter = EnergyMeter::new(1_000);
        meter.charge(100).unwrap();
        meter.charge(250).unwrap();
        assert_eq!(meter.used(), 350);
        assert_eq!(meter.remaining(), 650);
    }

    #[test]
    fn test_charge_up_to_limit_succeeds() {
        let mut meter = EnergyMeter::new(100);
        meter.charge(100).unwrap();
        assert_eq!(meter.remaining(), 0);
        meter.charge(0).unwrap();
    }

    #[test]
    fn test_exhaustion_spends_everything() {
        let mut meter = EnergyMeter::new(100);
        meter.charge(60).unwrap();
        let err = meter.charge(41).unwrap_err();
        assert_eq!(err, SandboxException::OutOfEnergy { limit: 100, requested: 41, remaining: 40 });
        assert_eq!(meter.used(), 100);
        assert_eq!(meter.remaining(), 0);
    }

    #[test]
    fn test_overflowing_charge_is_exhaustion() {
        let mut meter = EnergyMeter::new(u64::MAX);
        meter.charge(1).unwrap();
        assert!(meter.charge(u64::MAX).is_err());
        assert_eq!(meter.used(), u64::MAX);
    }

    #[test]
    fn test_deserialize_rejects_overdrawn_ledger() {
        let err = serde_json::from_str::<EnergyMeter>(r#"{"limit":1,"used":5}"#).unwrap_err();
        assert!(err.to_string().contains("energy used 5 exceeds limit 1"));

        let mut meter = EnergyMeter::new(10);
        meter.charge(4).unwrap();
        let json = serde_json::to_string(&meter).unwrap();
        assert_eq!(json, r#"{"limit":10,"used":4}"#);
        let restored: EnergyMeter = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.remaining(), 6);
    }

    #[test]
    fn test_snapshot_reflects_charges() {
        let mut meter = EnergyMeter::new(10);
        meter.charge(3).unwrap();
        let snapshot = meter.snapshot();
        assert_eq!(snapshot, EnergySnapshot { limit: 10, used: 3 });
        assert_eq!(snapshot.remaining(), 7);
    }
}
