//! Machine snapshots.
//!
//! A snapshot holds everything on the board side of the CPU pins: both
//! RRIOTs (registers, timer, pipelines, RAM), board RAM, the peripheral
//! inputs and the pin masks in flight between ticks. ROMs and the address
//! map come from the configuration and are not stored. The CPU is a
//! separate collaborator and saves its own state.

use std::fmt;

use emu_core::Pins;
use mos_rriot_6530::{RAM_SIZE as RRIOT_RAM_SIZE, Rriot6530};
use serde::{Deserialize, Serialize};

use crate::address_map::ChipId;
use crate::memory::RAM_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kim1Snapshot {
    pub cycles: u64,
    /// Mask the CPU will see on its next tick.
    pub cpu_pins: Pins,
    pub nmi: bool,
    pub ram: Vec<u8>,
    /// Indexed by [`ChipId::index`].
    pub rriots: [Rriot6530; 2],
    pub inputs: [Pins; 2],
    pub outputs: [Pins; 2],
}

impl Kim1Snapshot {
    /// Reject snapshots whose RAM images do not fit the hardware.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.ram.len() != RAM_SIZE {
            return Err(SnapshotError::RamSize {
                expected: RAM_SIZE,
                actual: self.ram.len(),
            });
        }
        for chip in ChipId::ALL {
            let actual = self.rriots[chip.index()].ram().len();
            if actual != RRIOT_RAM_SIZE {
                return Err(SnapshotError::RriotRamSize { chip, actual });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    RamSize { expected: usize, actual: usize },
    RriotRamSize { chip: ChipId, actual: usize },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "snapshot JSON: {e}"),
            Self::RamSize { expected, actual } => write!(
                f,
                "snapshot RAM is {actual} bytes (expected {expected})"
            ),
            Self::RriotRamSize { chip, actual } => write!(
                f,
                "snapshot {chip} RAM is {actual} bytes (expected {RRIOT_RAM_SIZE})"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Kim1Snapshot {
        Kim1Snapshot {
            cycles: 7,
            cpu_pins: Pins::NONE,
            nmi: false,
            ram: vec![0; RAM_SIZE],
            rriots: [Rriot6530::new(), Rriot6530::new()],
            inputs: [Pins::NONE; 2],
            outputs: [Pins::NONE; 2],
        }
    }

    #[test]
    fn json_round_trip_preserves_chip_state() {
        let mut snapshot = blank();
        snapshot.rriots[1].load_ram(&[0xAB; 4]);
        let json = snapshot.to_json().unwrap();
        assert_eq!(Kim1Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn short_ram_is_rejected() {
        let mut snapshot = blank();
        snapshot.ram.truncate(100);
        let json = serde_json::to_string(&snapshot).unwrap();
        let err = Kim1Snapshot::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::RamSize {
                expected: 1024,
                actual: 100
            }
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = Kim1Snapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        assert!(err.to_string().starts_with("snapshot JSON:"));
    }
}
