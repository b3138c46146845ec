//! The 64-bit pin mask shared by every chip on a bus.
//!
//! Each bit is one physical signal at a position agreed by every chip on the
//! bus. The mask itself knows nothing about the layout: chip crates publish
//! their bit positions and build named accessors on top of these primitives.

use std::fmt;

/// Instantaneous state of up to 64 named signals.
///
/// Constructed fresh each cycle, transformed by each chip in turn, then
/// discarded. A chip may only rewrite the bits it drives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pins(pub u64);

impl Pins {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True if every bit in `mask` is high.
    #[must_use]
    pub const fn is_high(self, mask: u64) -> bool {
        self.0 & mask == mask
    }

    /// True if any bit in `mask` is high.
    #[must_use]
    pub const fn any_high(self, mask: u64) -> bool {
        self.0 & mask != 0
    }

    /// Copy with the bits in `mask` driven to `level`.
    #[must_use]
    pub const fn with(self, mask: u64, level: bool) -> Self {
        if level {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Drive the bits in `mask` to `level` in place.
    pub fn set(&mut self, mask: u64, level: bool) {
        *self = self.with(mask, level);
    }

    /// Extract an unshifted field: `(bits >> shift) & mask`.
    #[must_use]
    pub const fn field(self, shift: u32, mask: u64) -> u64 {
        (self.0 >> shift) & mask
    }

    /// Copy with the field at `shift` (of width given by `mask`) replaced.
    ///
    /// Bits of `value` outside `mask` are dropped.
    #[must_use]
    pub const fn with_field(self, shift: u32, mask: u64, value: u64) -> Self {
        Self((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }

    /// The 8-bit field starting at bit `shift`.
    #[must_use]
    pub const fn byte_at(self, shift: u32) -> u8 {
        self.field(shift, 0xFF) as u8
    }

    /// Copy with the 8-bit field at `shift` replaced by `value`.
    #[must_use]
    pub const fn with_byte_at(self, shift: u32, value: u8) -> Self {
        self.with_field(shift, 0xFF, value as u64)
    }
}

impl From<u64> for Pins {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<Pins> for u64 {
    fn from(pins: Pins) -> Self {
        pins.0
    }
}

impl core::ops::BitOr for Pins {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pins({:#018X})", self.0)
    }
}
