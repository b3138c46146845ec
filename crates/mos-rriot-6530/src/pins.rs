//! Pin layout of the 6530 on the shared 64-bit mask.
//!
//! ```text
//!            +-----------+
//!    A0 ---> |           | <--> PA0
//!       ...  |           | ...
//!    A9 ---> |           | <--> PA7
//!   RS0 ---> |           | <--> PB0
//!    RW ---> |           | ...
//!   RES ---> |   6530    | <--> PB7
//!   DB0 <--> |           | <--- CA1
//!       ...  |           | <--> CA2
//!   DB7 <--> |           | <--- CB1
//!   CS1 ---> |           | <--> CB2
//!   CS2 ---> |           | ---> IRQ
//!            +-----------+
//! ```
//!
//! Address, RW and data positions match the ones every other chip on the bus
//! uses. CS1, CS2 and IRQ sit at their own bits (41..43) rather than sharing
//! PB5..PB7; see DESIGN.md for the layout discrepancy this resolves.

use emu_core::Pins;

// Pin numbers.
pub const PIN_A0: u32 = 0;
pub const PIN_RS0: u32 = 10;
pub const PIN_RW: u32 = 11;
pub const PIN_RES: u32 = 12;
pub const PIN_D0: u32 = 16;
pub const PIN_PA0: u32 = 24;
pub const PIN_PB0: u32 = 32;
pub const PIN_CS2: u32 = 41;
pub const PIN_CS1: u32 = 42;
pub const PIN_IRQ: u32 = 43;
pub const PIN_CA1: u32 = 44;
pub const PIN_CA2: u32 = 45;
pub const PIN_CB1: u32 = 46;
pub const PIN_CB2: u32 = 47;

// Pin bit masks.
/// A0..A9, unshifted.
pub const ADDRESS_MASK: u64 = 0x3FF;
pub const ADDRESS_PINS: u64 = ADDRESS_MASK << PIN_A0;
/// RAM select: high routes the access to on-chip RAM instead of registers.
pub const RS0: u64 = 1 << PIN_RS0;
/// High = read, low = write.
pub const RW: u64 = 1 << PIN_RW;
pub const RES: u64 = 1 << PIN_RES;
pub const DB_PINS: u64 = 0xFF << PIN_D0;
pub const PA_PINS: u64 = 0xFF << PIN_PA0;
pub const PB_PINS: u64 = 0xFF << PIN_PB0;
pub const CS2: u64 = 1 << PIN_CS2;
pub const CS1: u64 = 1 << PIN_CS1;
pub const IRQ: u64 = 1 << PIN_IRQ;
pub const CA1: u64 = 1 << PIN_CA1;
pub const CA2: u64 = 1 << PIN_CA2;
pub const CB1: u64 = 1 << PIN_CB1;
pub const CB2: u64 = 1 << PIN_CB2;

/// Register select lines (A0..A3).
pub const REGISTER_SELECT_MASK: u64 = 0x0F;
/// On-chip RAM address lines (A0..A5).
pub const RAM_ADDRESS_MASK: u64 = 0x3F;

/// Named access to the 6530 signal groups.
pub trait RriotPins: Sized {
    /// A0..A9.
    fn address(self) -> u16;
    /// A0..A3, as decoded for register accesses.
    fn register_select(self) -> u8;
    /// A0..A5, as decoded for RAM accesses.
    fn ram_offset(self) -> usize;
    /// CS1 high and CS2 low.
    fn is_selected(self) -> bool;
    fn is_read(self) -> bool;
    fn is_ram_select(self) -> bool;
    fn is_reset(self) -> bool;
    fn data(self) -> u8;
    #[must_use]
    fn with_data(self, data: u8) -> Self;
    fn port_a(self) -> u8;
    #[must_use]
    fn with_port_a(self, value: u8) -> Self;
    fn port_b(self) -> u8;
    #[must_use]
    fn with_port_b(self, value: u8) -> Self;
    #[must_use]
    fn with_ports(self, a: u8, b: u8) -> Self;
    /// Drive A0..A9, RW and chip-select for one register or RAM access.
    #[must_use]
    fn with_access(self, address: u16, read: bool) -> Self;
}

impl RriotPins for Pins {
    fn address(self) -> u16 {
        self.field(PIN_A0, ADDRESS_MASK) as u16
    }

    fn register_select(self) -> u8 {
        self.field(PIN_A0, REGISTER_SELECT_MASK) as u8
    }

    fn ram_offset(self) -> usize {
        self.field(PIN_A0, RAM_ADDRESS_MASK) as usize
    }

    fn is_selected(self) -> bool {
        self.is_high(CS1) && !self.any_high(CS2)
    }

    fn is_read(self) -> bool {
        self.is_high(RW)
    }

    fn is_ram_select(self) -> bool {
        self.is_high(RS0)
    }

    fn is_reset(self) -> bool {
        self.is_high(RES)
    }

    fn data(self) -> u8 {
        self.byte_at(PIN_D0)
    }

    fn with_data(self, data: u8) -> Self {
        self.with_byte_at(PIN_D0, data)
    }

    fn port_a(self) -> u8 {
        self.byte_at(PIN_PA0)
    }

    fn with_port_a(self, value: u8) -> Self {
        self.with_byte_at(PIN_PA0, value)
    }

    fn port_b(self) -> u8 {
        self.byte_at(PIN_PB0)
    }

    fn with_port_b(self, value: u8) -> Self {
        self.with_byte_at(PIN_PB0, value)
    }

    fn with_ports(self, a: u8, b: u8) -> Self {
        self.with_port_a(a).with_port_b(b)
    }

    fn with_access(self, address: u16, read: bool) -> Self {
        self.with_field(PIN_A0, ADDRESS_MASK, u64::from(address))
            .with(RW, read)
            .with(CS1, true)
            .with(CS2, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_round_trips_every_byte() {
        for value in 0..=255u8 {
            let pins = Pins::new(u64::MAX).with_data(value);
            assert_eq!(pins.data(), value);
            assert_eq!(pins.bits() & !DB_PINS, u64::MAX & !DB_PINS);
        }
    }

    #[test]
    fn port_fields_round_trip_every_byte() {
        for value in 0..=255u8 {
            assert_eq!(Pins::NONE.with_port_a(value).port_a(), value);
            assert_eq!(Pins::NONE.with_port_b(value).port_b(), value);
        }
    }

    #[test]
    fn ports_do_not_disturb_each_other() {
        let base = Pins::new(!(PA_PINS | PB_PINS));
        let merged = base.with_ports(0xA5, 0x3C);
        assert_eq!(merged.port_a(), 0xA5);
        assert_eq!(merged.port_b(), 0x3C);
        assert_eq!(merged.bits() & !(PA_PINS | PB_PINS), base.bits());

        let only_a = merged.with_port_a(0x00);
        assert_eq!(only_a.port_b(), 0x3C);
    }

    #[test]
    fn masks_derive_from_pin_numbers() {
        assert_eq!(RS0, 0x400);
        assert_eq!(RW, 0x800);
        assert_eq!(DB_PINS, 0xFF_0000);
        assert_eq!(CS1, 1 << 42);
        assert_eq!(CS2, 1 << 41);
        assert_eq!(IRQ & (PA_PINS | PB_PINS), 0);
    }

    #[test]
    fn selection_needs_cs1_high_and_cs2_low() {
        assert!(Pins::new(CS1).is_selected());
        assert!(!Pins::new(CS1 | CS2).is_selected());
        assert!(!Pins::new(CS2).is_selected());
        assert!(!Pins::NONE.is_selected());
    }

    #[test]
    fn access_sets_address_and_direction() {
        let pins = Pins::NONE.with_access(0x3C5, true);
        assert_eq!(pins.address(), 0x3C5);
        assert_eq!(pins.register_select(), 0x5);
        assert_eq!(pins.ram_offset(), 0x05);
        assert!(pins.is_read());
        assert!(pins.is_selected());
    }
}
