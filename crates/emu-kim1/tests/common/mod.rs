//! Scripted pin-level CPU: replays a fixed list of bus cycles and records
//! the pins it was handed on each tick.

#![allow(dead_code)]

use std::collections::VecDeque;

use emu_core::{PinTickable, Pins};
use emu_kim1::cpu_pins::CpuPins;

/// One bus cycle: read `address`, or write `Some(data)` to it.
#[derive(Debug, Clone, Copy)]
pub struct Cycle {
    pub address: u16,
    pub write: Option<u8>,
}

pub fn read(address: u16) -> Cycle {
    Cycle {
        address,
        write: None,
    }
}

pub fn write(address: u16, data: u8) -> Cycle {
    Cycle {
        address,
        write: Some(data),
    }
}

/// Address the CPU reads once the script runs out. Unmapped on the stock
/// map, so idling touches nothing.
pub const IDLE_ADDRESS: u16 = 0x0800;

#[derive(Debug, Default)]
pub struct ScriptedCpu {
    script: VecDeque<Cycle>,
    /// Pins received on each tick, in order.
    pub seen: Vec<Pins>,
    pub resets: usize,
}

impl ScriptedCpu {
    pub fn new(script: Vec<Cycle>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// Queue more cycles after whatever is left.
    pub fn push(&mut self, cycles: &[Cycle]) {
        self.script.extend(cycles.iter().copied());
    }

    /// Data byte the CPU received for the bus cycle it put out on tick
    /// `tick` (0-based). It arrives on the following tick.
    pub fn data_for(&self, tick: usize) -> u8 {
        self.seen[tick + 1].cpu_data()
    }

    pub fn last_seen(&self) -> Pins {
        self.seen.last().copied().unwrap_or(Pins::NONE)
    }
}

impl PinTickable for ScriptedCpu {
    fn tick(&mut self, pins: Pins) -> Pins {
        self.seen.push(pins);
        let cycle = self.script.pop_front().unwrap_or(read(IDLE_ADDRESS));
        Pins::NONE.with_cpu_cycle(cycle.address, cycle.write)
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}
