//! Master clock configuration.

use std::time::Duration;

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Each system has a master crystal that drives all timing. Components may
/// run at divided rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `1_000_000` for the KIM-1).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Number of ticks covering `duration`, rounded down.
    #[must_use]
    pub fn ticks_for(&self, duration: Duration) -> Ticks {
        let ticks = duration.as_nanos() * u128::from(self.frequency_hz) / 1_000_000_000;
        Ticks::new(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Wall-clock time taken by `ticks` at this frequency.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(ticks.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}
