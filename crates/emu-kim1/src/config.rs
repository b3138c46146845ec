//! KIM-1 configuration: clock, ROM images and address map.

use std::fmt;

use emu_core::MasterClock;

use crate::address_map::{AddressMap, ChipId};

/// Size of each RRIOT mask ROM.
pub const ROM_SIZE: usize = 1024;

/// The KIM-1 runs its 6502 from a 1 MHz crystal.
pub const KIM1_CLOCK_HZ: u64 = 1_000_000;

/// Configuration for constructing a KIM-1 instance.
#[derive(Debug, Clone)]
pub struct Kim1Config {
    pub clock: MasterClock,
    /// 6530-002 ROM (1,024 bytes, monitor at $1C00).
    pub rom_002: Vec<u8>,
    /// 6530-003 ROM (1,024 bytes, tape routines at $1800).
    pub rom_003: Vec<u8>,
    /// Replacement address map. `None` uses the stock layout.
    pub map: Option<AddressMap>,
}

impl Kim1Config {
    /// Check ROM sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rom(ChipId::Rriot002, &self.rom_002)?;
        check_rom(ChipId::Rriot003, &self.rom_003)
    }
}

/// A mask ROM image must be exactly [`ROM_SIZE`] bytes.
pub(crate) fn check_rom(chip: ChipId, rom: &[u8]) -> Result<(), ConfigError> {
    if rom.len() == ROM_SIZE {
        Ok(())
    } else {
        Err(ConfigError::RomSize {
            chip,
            len: rom.len(),
        })
    }
}

impl Default for Kim1Config {
    /// 1 MHz, stock map, unprogrammed (all $FF) ROMs.
    fn default() -> Self {
        Self {
            clock: MasterClock::new(KIM1_CLOCK_HZ),
            rom_002: vec![0xFF; ROM_SIZE],
            rom_003: vec![0xFF; ROM_SIZE],
            map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RomSize { chip: ChipId, len: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomSize { chip, len } => write!(
                f,
                "{chip} ROM must be {ROM_SIZE} bytes, got {len}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
