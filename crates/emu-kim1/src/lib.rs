//! KIM-1 single-board computer: a 6502, two 6530 RRIOTs and 1K of RAM.
//!
//! The 6530-002 carries the monitor ROM and scans the keypad and LED
//! display; the 6530-003 carries the tape routines and the user ports.
//! The CPU is a collaborator: any [`emu_core::PinTickable`] that speaks the
//! [`cpu_pins`] layout can drive the board.
//!
//! ```ignore
//! let mut kim = Kim1::new(cpu, Kim1Config::default())?;
//! kim.reset();
//! kim.set_port_input(ChipId::Rriot002, PortId::A, key_rows);
//! kim.run(Ticks::new(1_000));
//! let segments = kim.port_output(ChipId::Rriot002, PortId::A);
//! ```

pub mod address_map;
pub mod config;
pub mod cpu_pins;
mod kim1;
pub mod memory;
pub mod snapshot;

pub use address_map::{AddressMap, AddressMapError, ChipId, Region, Target};
pub use config::{ConfigError, Kim1Config};
pub use kim1::{ControlPin, Kim1};
pub use memory::Kim1Memory;
pub use mos_rriot_6530::port::PortId;
pub use snapshot::{Kim1Snapshot, SnapshotError};
