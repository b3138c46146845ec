//! Core traits and types for cycle-accurate emulation.
//!
//! Everything ticks at the master crystal frequency. All component timing
//! derives from this. No exceptions.
//!
//! Chips talk to each other only through a [`Pins`] mask: the orchestrator
//! builds one per cycle, every chip reads the bits it cares about and
//! rewrites only the bits it drives.

mod bus;
mod clock;
mod observable;
mod pins;
mod tickable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use pins::Pins;
pub use tickable::{PinTickable, Tickable};
pub use ticks::Ticks;
