//! Fixed-depth delay lines for hardware propagation latency.
//!
//! The 6530 does not apply some effects on the cycle they are requested: a
//! timer write forces the counter load one cycle later, and the counter
//! starts decrementing two cycles after that. A [`DelayLine`] holds those
//! pending effects and reports when one falls due.

/// A shift register of pending one-bit effects, at most `DEPTH` ticks deep.
///
/// `schedule(n)` makes the effect due `n` calls to [`advance`](Self::advance)
/// from now. `schedule(0)` is due immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayLine<const DEPTH: u32> {
    /// Bit `n` set = an effect becomes due after `n` more advances.
    pending: u8,
}

impl<const DEPTH: u32> DelayLine<DEPTH> {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: 0 }
    }

    /// Make an effect due `ticks` advances from now.
    ///
    /// # Panics
    ///
    /// If `ticks` does not fit in the line. That is a wiring bug in the chip
    /// model, not something emulated software can cause.
    pub fn schedule(&mut self, ticks: u32) {
        assert!(
            ticks < DEPTH && ticks < u8::BITS,
            "delay of {ticks} ticks exceeds line depth {DEPTH}"
        );
        self.pending |= 1 << ticks;
    }

    /// True if an effect is due on the current tick.
    #[must_use]
    pub const fn is_due(&self) -> bool {
        self.pending & 1 != 0
    }

    /// True if nothing is scheduled at all.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.pending == 0
    }

    /// Move one tick forward. An effect that was due and not consumed is lost.
    pub fn advance(&mut self) {
        self.pending >>= 1;
    }

    /// Drop every pending effect.
    pub fn cancel(&mut self) {
        self.pending = 0;
    }
}
