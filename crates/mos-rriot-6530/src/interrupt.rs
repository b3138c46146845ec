//! Interrupt flag/enable pair with one tick of propagation delay.
//!
//! Sources set bits in the flag register; the IRQ pin is the OR of flags
//! that are also enabled. Flags reach the pin one tick after they are set
//! (the flag register is latched at the end of each tick), while the enable
//! mask applies immediately.

/// Interrupt unit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptUnit {
    /// Interrupt enable register.
    ier: u8,
    /// Interrupt flag register.
    ifr: u8,
    /// Flag register as it stood at the end of the previous tick.
    delayed: u8,
}

/// Flag bits 0-6; bit 7 is the read-only summary.
const SOURCE_MASK: u8 = 0x7F;

impl InterruptUnit {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ier: 0,
            ifr: 0,
            delayed: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Set flag bits.
    pub fn raise(&mut self, flags: u8) {
        self.ifr |= flags & SOURCE_MASK;
    }

    /// Clear flag bits. Only register accesses call this.
    pub fn acknowledge(&mut self, flags: u8) {
        self.ifr &= !flags;
    }

    /// IER write: bit 7 set enables the given bits, clear disables them.
    pub fn write_enable(&mut self, value: u8) {
        if value & 0x80 != 0 {
            self.ier |= value & SOURCE_MASK;
        } else {
            self.ier &= !(value & SOURCE_MASK);
        }
    }

    /// IFR as read by the CPU: bit 7 reports any enabled flag set right now.
    #[must_use]
    pub const fn read_flags(&self) -> u8 {
        let any = if self.ifr & self.ier != 0 { 0x80 } else { 0 };
        self.ifr | any
    }

    /// Level of the IRQ pin on the current tick.
    #[must_use]
    pub const fn irq(&self) -> bool {
        self.delayed & self.ier != 0
    }

    /// End-of-tick latch of the flag register.
    pub fn advance(&mut self) {
        self.delayed = self.ifr;
    }

    #[must_use]
    pub const fn ier(&self) -> u8 {
        self.ier
    }

    #[must_use]
    pub const fn ifr(&self) -> u8 {
        self.ifr
    }
}
