//! KIM-1 address decoding.
//!
//! The KIM-1 decodes only A0..A12, so the 8K window repeats eight times
//! across the 6502's 64K space. Within the window:
//!
//! | Range         | Device                  |
//! |---------------|-------------------------|
//! | $0000-$03FF   | 1K RAM                  |
//! | $1700-$173F   | 6530-003 I/O and timer  |
//! | $1740-$177F   | 6530-002 I/O and timer  |
//! | $1780-$17BF   | 6530-003 RAM            |
//! | $17C0-$17FF   | 6530-002 RAM            |
//! | $1800-$1BFF   | 6530-003 ROM (tape)     |
//! | $1C00-$1FFF   | 6530-002 ROM (monitor)  |
//!
//! Anything else is open bus.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address lines decoded by the board (A0..A12).
pub const MIRROR_MASK: u16 = 0x1FFF;

/// One of the two RRIOTs on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipId {
    /// Keyboard, display and monitor ROM.
    Rriot002,
    /// Tape interface and user ports.
    Rriot003,
}

impl ChipId {
    pub const ALL: [ChipId; 2] = [ChipId::Rriot002, ChipId::Rriot003];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ChipId::Rriot002 => 0,
            ChipId::Rriot003 => 1,
        }
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipId::Rriot002 => f.write_str("6530-002"),
            ChipId::Rriot003 => f.write_str("6530-003"),
        }
    }
}

/// What a decoded address reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Main board RAM.
    Ram,
    /// The mask ROM inside a RRIOT.
    Rom(ChipId),
    /// A RRIOT's I/O, timer and interrupt registers (RS0 low).
    RriotIo(ChipId),
    /// A RRIOT's 64-byte static RAM (RS0 high).
    RriotRam(ChipId),
}

/// An inclusive address range and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: u16,
    pub end: u16,
    pub target: Target,
}

impl Region {
    #[must_use]
    pub const fn new(start: u16, end: u16, target: Target) -> Self {
        Self { start, end, target }
    }

    #[must_use]
    pub const fn contains(&self, address: u16) -> bool {
        address >= self.start && address <= self.end
    }

    const fn overlaps(&self, other: &Region) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}-${:04X}", self.start, self.end)
    }
}

/// Result of decoding one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub target: Target,
    /// Offset from the start of the region.
    pub offset: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressMapError {
    /// `end` is below `start`.
    EmptyRange(Region),
    /// The region reaches past the decoded window.
    OutOfRange(Region),
    /// Two regions claim the same address.
    Overlap(Region, Region),
}

impl fmt::Display for AddressMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange(region) => write!(f, "empty address range {region}"),
            Self::OutOfRange(region) => write!(
                f,
                "address range {region} lies outside the decoded window $0000-${MIRROR_MASK:04X}"
            ),
            Self::Overlap(a, b) => write!(f, "address ranges {a} and {b} overlap"),
        }
    }
}

impl std::error::Error for AddressMapError {}

/// Validated, non-overlapping list of regions.
///
/// Serialized as a plain list of regions; deserializing runs the same checks
/// as [`AddressMap::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Region>", into = "Vec<Region>")]
pub struct AddressMap {
    regions: Vec<Region>,
}

impl TryFrom<Vec<Region>> for AddressMap {
    type Error = AddressMapError;

    fn try_from(regions: Vec<Region>) -> Result<Self, Self::Error> {
        Self::new(regions)
    }
}

impl From<AddressMap> for Vec<Region> {
    fn from(map: AddressMap) -> Self {
        map.regions
    }
}

impl AddressMap {
    /// Build a map, rejecting empty, out-of-window and overlapping ranges.
    pub fn new(regions: Vec<Region>) -> Result<Self, AddressMapError> {
        for (i, region) in regions.iter().enumerate() {
            if region.end < region.start {
                return Err(AddressMapError::EmptyRange(*region));
            }
            if region.end > MIRROR_MASK {
                return Err(AddressMapError::OutOfRange(*region));
            }
            if let Some(other) = regions[..i].iter().find(|r| r.overlaps(region)) {
                return Err(AddressMapError::Overlap(*other, *region));
            }
        }
        Ok(Self { regions })
    }

    /// The stock KIM-1 layout.
    #[must_use]
    pub fn kim1() -> Self {
        use ChipId::{Rriot002, Rriot003};
        Self {
            regions: vec![
                Region::new(0x0000, 0x03FF, Target::Ram),
                Region::new(0x1700, 0x173F, Target::RriotIo(Rriot003)),
                Region::new(0x1740, 0x177F, Target::RriotIo(Rriot002)),
                Region::new(0x1780, 0x17BF, Target::RriotRam(Rriot003)),
                Region::new(0x17C0, 0x17FF, Target::RriotRam(Rriot002)),
                Region::new(0x1800, 0x1BFF, Target::Rom(Rriot003)),
                Region::new(0x1C00, 0x1FFF, Target::Rom(Rriot002)),
            ],
        }
    }

    /// Decode a CPU address. Addresses mirror through A0..A12.
    #[must_use]
    pub fn decode(&self, address: u16) -> Option<Decoded> {
        let address = address & MIRROR_MASK;
        self.regions
            .iter()
            .find(|r| r.contains(address))
            .map(|r| Decoded {
                target: r.target,
                offset: address - r.start,
            })
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for AddressMap {
    fn default() -> Self {
        Self::kim1()
    }
}
