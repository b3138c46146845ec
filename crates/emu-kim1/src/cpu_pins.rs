//! 6502 pin layout on the shared 64-bit mask.
//!
//! The CPU drives A0..A15, RW and (on writes) D0..D7, and samples D0..D7,
//! IRQ, NMI, RDY and RES. Data sits on bits 16..23 like every other chip.

use emu_core::Pins;

pub const PIN_A0: u32 = 0;
pub const PIN_D0: u32 = 16;
pub const PIN_RW: u32 = 24;
pub const PIN_IRQ: u32 = 26;
pub const PIN_NMI: u32 = 27;
pub const PIN_RDY: u32 = 28;
pub const PIN_RES: u32 = 30;

pub const ADDRESS_MASK: u64 = 0xFFFF;
pub const RW: u64 = 1 << PIN_RW;
pub const IRQ: u64 = 1 << PIN_IRQ;
pub const NMI: u64 = 1 << PIN_NMI;
pub const RDY: u64 = 1 << PIN_RDY;
pub const RES: u64 = 1 << PIN_RES;

/// Named access to the 6502 signal groups.
pub trait CpuPins: Sized {
    fn cpu_address(self) -> u16;
    fn cpu_data(self) -> u8;
    /// RW high.
    fn cpu_reads(self) -> bool;
    #[must_use]
    fn with_cpu_data(self, data: u8) -> Self;
    /// Drive address and RW, plus data on writes.
    #[must_use]
    fn with_cpu_cycle(self, address: u16, write: Option<u8>) -> Self;
}

impl CpuPins for Pins {
    fn cpu_address(self) -> u16 {
        self.field(PIN_A0, ADDRESS_MASK) as u16
    }

    fn cpu_data(self) -> u8 {
        self.byte_at(PIN_D0)
    }

    fn cpu_reads(self) -> bool {
        self.is_high(RW)
    }

    fn with_cpu_data(self, data: u8) -> Self {
        self.with_byte_at(PIN_D0, data)
    }

    fn with_cpu_cycle(self, address: u16, write: Option<u8>) -> Self {
        let pins = self
            .with_field(PIN_A0, ADDRESS_MASK, u64::from(address))
            .with(RW, write.is_none());
        match write {
            Some(data) => pins.with_cpu_data(data),
            None => pins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_fields() {
        let read = Pins::NONE.with_cpu_cycle(0x1C22, None);
        assert_eq!(read.cpu_address(), 0x1C22);
        assert!(read.cpu_reads());

        let write = Pins::NONE.with_cpu_cycle(0x0200, Some(0xA9));
        assert!(!write.cpu_reads());
        assert_eq!(write.cpu_data(), 0xA9);
        assert_eq!(write.bits() & (IRQ | NMI | RES), 0);
    }
}
