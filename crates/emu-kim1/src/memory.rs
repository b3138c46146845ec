//! KIM-1 backing store: 1K board RAM and the two RRIOT mask ROMs.
//!
//! The RRIOTs' own 64-byte RAMs live inside the chips and are reached over
//! their pins, not through here.

use emu_core::Bus;

use crate::address_map::{AddressMap, ChipId, Target};
use crate::config::{ConfigError, ROM_SIZE, check_rom};

/// Board RAM size.
pub const RAM_SIZE: usize = 1024;

/// Value read from addresses nothing answers.
pub const OPEN_BUS: u8 = 0xFF;

/// RAM and ROM behind the address map, addressed by CPU address.
pub struct Kim1Memory {
    map: AddressMap,
    ram: Vec<u8>,
    /// ROM images indexed by [`ChipId::index`].
    roms: [Vec<u8>; 2],
}

impl Kim1Memory {
    /// Fails unless both ROMs are [`ROM_SIZE`] bytes.
    pub fn new(map: AddressMap, rom_002: &[u8], rom_003: &[u8]) -> Result<Self, ConfigError> {
        check_rom(ChipId::Rriot002, rom_002)?;
        check_rom(ChipId::Rriot003, rom_003)?;
        Ok(Self {
            map,
            ram: vec![0; RAM_SIZE],
            roms: [rom_002.to_vec(), rom_003.to_vec()],
        })
    }

    #[must_use]
    pub fn map(&self) -> &AddressMap {
        &self.map
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Replace board RAM wholesale (snapshots). Length must be [`RAM_SIZE`].
    pub(crate) fn set_ram(&mut self, ram: Vec<u8>) {
        self.ram = ram;
    }

    /// Copy `data` into board RAM starting at `offset`, clipped to its end.
    pub fn load_ram(&mut self, offset: usize, data: &[u8]) {
        let start = offset.min(RAM_SIZE);
        let len = data.len().min(RAM_SIZE - start);
        self.ram[start..start + len].copy_from_slice(&data[..len]);
    }

    /// Byte at a CPU address, or `None` if it is not RAM or ROM.
    fn fetch(&self, address: u16) -> Option<u8> {
        let decoded = self.map.decode(address)?;
        let offset = usize::from(decoded.offset);
        match decoded.target {
            Target::Ram => Some(self.ram[offset % RAM_SIZE]),
            Target::Rom(chip) => Some(self.roms[chip.index()][offset % ROM_SIZE]),
            Target::RriotIo(_) | Target::RriotRam(_) => None,
        }
    }
}

impl Bus for Kim1Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        match self.map.decode(address) {
            Some(decoded) if decoded.target == Target::Ram => {
                self.ram[usize::from(decoded.offset) % RAM_SIZE] = value;
            }
            Some(decoded) => {
                log::trace!(
                    "ignored write ${value:02X} to ${address:04X} ({:?})",
                    decoded.target
                );
            }
            None => log::trace!("write ${value:02X} to unmapped ${address:04X}"),
        }
    }

    fn peek(&self, address: u16) -> u8 {
        self.fetch(address).unwrap_or(OPEN_BUS)
    }
}
