//! Traits for components advanced by clock ticks.

use crate::{Pins, Ticks};

/// A component that can be advanced by clock ticks.
///
/// Used by whole machines: one `tick()` runs every chip for one cycle.
pub trait Tickable {
    /// Advance the component by one master clock tick.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}

/// A chip driven purely through its pins.
///
/// Each cycle the orchestrator hands the chip the current bus state and gets
/// back the same mask with the chip's own output pins rewritten. Bits the
/// chip does not drive must come back unchanged. Given the same internal
/// state and the same input mask, `tick` must always produce the same result.
///
/// CPUs implement this too: they receive the previous cycle's data/IRQ pins
/// and return the address/data/control pins for the next cycle.
pub trait PinTickable {
    /// Advance one cycle.
    fn tick(&mut self, pins: Pins) -> Pins;

    /// Return to the power-on idle state.
    fn reset(&mut self);
}
