//! Top-level KIM-1 system.
//!
//! The master clock ticks at the 1 MHz CPU rate. Every chip is advanced once
//! per tick by handing it a pin mask and taking back its outputs.
//!
//! # Tick loop
//!
//! Each tick:
//! 1. CPU: sample last tick's data, IRQ and NMI; put out the next bus cycle
//! 2. Decode the address through the address map
//! 3. Build each RRIOT's mask (selection, RS0, RW, A0..A9, data, port and
//!    control-line inputs) and tick both chips
//! 4. Board RAM/ROM access
//! 5. Hand the responding device's byte and the wired-OR of both IRQ
//!    outputs to the CPU for its next tick
//!
//! IRQ and NMI are active-high on the mask; the board's open-collector
//! inversion is not modelled.

use std::time::Duration;

use emu_core::{Bus, MasterClock, Observable, PinTickable, Pins, Tickable, Ticks, Value};
use mos_rriot_6530::Rriot6530;
use mos_rriot_6530::pins::{self as rriot, RriotPins};
use mos_rriot_6530::port::PortId;
use mos_rriot_6530::registers::Register;

use crate::address_map::{ChipId, Decoded, Target};
use crate::config::{ConfigError, Kim1Config};
use crate::cpu_pins::{self, CpuPins};
use crate::memory::{Kim1Memory, OPEN_BUS};
use crate::snapshot::{Kim1Snapshot, SnapshotError};

/// A RRIOT control line, as seen from the peripheral side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPin {
    Ca1,
    Ca2,
    Cb1,
    Cb2,
}

impl ControlPin {
    const fn mask(self) -> u64 {
        match self {
            ControlPin::Ca1 => rriot::CA1,
            ControlPin::Ca2 => rriot::CA2,
            ControlPin::Cb1 => rriot::CB1,
            ControlPin::Cb2 => rriot::CB2,
        }
    }
}

/// Bus access routed to one RRIOT this tick.
#[derive(Debug, Clone, Copy)]
struct ChipAccess {
    chip: ChipId,
    ram: bool,
    offset: u16,
}

/// KIM-1 system, generic over a pin-level 6502.
pub struct Kim1<C> {
    cpu: C,
    /// Mask the CPU samples on its next tick.
    cpu_in: Pins,
    /// Bus cycle the CPU put out on the last tick.
    cpu_out: Pins,
    memory: Kim1Memory,
    /// Indexed by [`ChipId::index`].
    rriots: [Rriot6530; 2],
    /// Peripheral-side port pins and control lines for each chip.
    inputs: [Pins; 2],
    /// Each chip's output mask from the last tick.
    outputs: [Pins; 2],
    nmi: bool,
    clock: MasterClock,
    cycles: u64,
}

impl<C: PinTickable> Kim1<C> {
    /// Build a KIM-1 around `cpu`.
    ///
    /// Port pins idle high (the board pulls them up) and control lines idle
    /// low until a peripheral drives them.
    pub fn new(cpu: C, config: Kim1Config) -> Result<Self, ConfigError> {
        let map = config.map.unwrap_or_default();
        let memory = Kim1Memory::new(map, &config.rom_002, &config.rom_003)?;
        log::debug!(
            "KIM-1: {} Hz, {} mapped regions",
            config.clock.frequency_hz,
            memory.map().regions().len()
        );
        let idle = Pins::new(rriot::PA_PINS | rriot::PB_PINS);
        Ok(Self {
            cpu,
            cpu_in: Pins::new(cpu_pins::RDY),
            cpu_out: Pins::NONE,
            memory,
            rriots: [Rriot6530::new(), Rriot6530::new()],
            inputs: [idle; 2],
            outputs: [idle; 2],
            nmi: false,
            clock: config.clock,
            cycles: 0,
        })
    }

    /// Reset the CPU and both RRIOTs. Board RAM and RRIOT RAM survive.
    pub fn reset(&mut self) {
        log::debug!("KIM-1 reset at cycle {}", self.cycles);
        self.cpu.reset();
        for chip in &mut self.rriots {
            chip.reset();
        }
        self.cpu_in = Pins::new(cpu_pins::RDY);
        self.cpu_out = Pins::NONE;
        self.outputs = self.inputs;
    }

    /// Run for `ticks` cycles.
    pub fn run(&mut self, ticks: Ticks) {
        self.tick_n(ticks);
    }

    /// Run for the number of cycles `duration` takes at the master clock.
    pub fn run_for(&mut self, duration: Duration) -> Ticks {
        let ticks = self.clock.ticks_for(duration);
        self.run(ticks);
        ticks
    }

    /// Tick until `done` returns true, checking after every tick. Returns
    /// the ticks taken, or `None` if `limit` ran out first.
    pub fn run_until(&mut self, mut done: impl FnMut(&Self) -> bool, limit: Ticks) -> Option<Ticks> {
        for taken in 1..=limit.get() {
            self.tick();
            if done(self) {
                return Some(Ticks::new(taken));
            }
        }
        None
    }

    /// Route the CPU's bus cycle to at most one RRIOT. Undecoded register
    /// selects ($E/$F in each 16-byte block) are left floating.
    fn chip_access(decoded: Option<Decoded>, address: u16) -> Option<ChipAccess> {
        let decoded = decoded?;
        match decoded.target {
            Target::RriotIo(chip) => {
                let select = (decoded.offset as u8) & rriot::REGISTER_SELECT_MASK as u8;
                if Register::decode(select).is_some() {
                    Some(ChipAccess {
                        chip,
                        ram: false,
                        offset: decoded.offset,
                    })
                } else {
                    log::trace!("{chip} register ${select:X} at ${address:04X} is not decoded");
                    None
                }
            }
            Target::RriotRam(chip) => Some(ChipAccess {
                chip,
                ram: true,
                offset: decoded.offset,
            }),
            Target::Ram | Target::Rom(_) => None,
        }
    }

    // Peripheral side.

    /// Drive a port's pins from outside. Only bits the chip treats as
    /// inputs have any effect.
    pub fn set_port_input(&mut self, chip: ChipId, port: PortId, value: u8) {
        let inputs = &mut self.inputs[chip.index()];
        *inputs = match port {
            PortId::A => inputs.with_port_a(value),
            PortId::B => inputs.with_port_b(value),
        };
    }

    pub fn set_control_line(&mut self, chip: ChipId, line: ControlPin, level: bool) {
        self.inputs[chip.index()].set(line.mask(), level);
    }

    /// Port pin levels as of the last tick: driven bits from the chip, the
    /// rest from the peripheral inputs.
    #[must_use]
    pub fn port_output(&self, chip: ChipId, port: PortId) -> u8 {
        let pins = self.outputs[chip.index()];
        match port {
            PortId::A => pins.port_a(),
            PortId::B => pins.port_b(),
        }
    }

    /// Control line level as of the last tick.
    #[must_use]
    pub fn control_output(&self, chip: ChipId, line: ControlPin) -> bool {
        self.outputs[chip.index()].is_high(line.mask())
    }

    /// Either RRIOT asserting IRQ on the last tick.
    #[must_use]
    pub fn irq(&self) -> bool {
        (self.outputs[0] | self.outputs[1]).is_high(rriot::IRQ)
    }

    /// Hold the NMI line (the ST key, or single-step logic).
    pub fn set_nmi(&mut self, level: bool) {
        self.nmi = level;
    }

    // Accessors.

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[must_use]
    pub fn rriot(&self, chip: ChipId) -> &Rriot6530 {
        &self.rriots[chip.index()]
    }

    #[must_use]
    pub fn memory(&self) -> &Kim1Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Kim1Memory {
        &mut self.memory
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn clock(&self) -> MasterClock {
        self.clock
    }

    /// Emulated time since power-on.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.duration_of(Ticks::new(self.cycles))
    }

    // Snapshots.

    #[must_use]
    pub fn snapshot(&self) -> Kim1Snapshot {
        Kim1Snapshot {
            cycles: self.cycles,
            cpu_pins: self.cpu_in,
            nmi: self.nmi,
            ram: self.memory.ram().to_vec(),
            rriots: self.rriots.clone(),
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }

    /// Restore board state. The machine is untouched if validation fails.
    pub fn restore(&mut self, snapshot: Kim1Snapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;
        self.cycles = snapshot.cycles;
        self.cpu_in = snapshot.cpu_pins;
        self.nmi = snapshot.nmi;
        self.memory.set_ram(snapshot.ram);
        self.rriots = snapshot.rriots;
        self.inputs = snapshot.inputs;
        self.outputs = snapshot.outputs;
        log::debug!("KIM-1 restored at cycle {}", self.cycles);
        Ok(())
    }

    pub fn save_state(&self) -> Result<String, SnapshotError> {
        self.snapshot().to_json()
    }

    pub fn load_state(&mut self, json: &str) -> Result<(), SnapshotError> {
        self.restore(Kim1Snapshot::from_json(json)?)
    }
}

impl<C: PinTickable> Tickable for Kim1<C> {
    fn tick(&mut self) {
        self.cycles += 1;

        // 1. CPU
        let cpu = self.cpu.tick(self.cpu_in);
        self.cpu_out = cpu;
        let address = cpu.cpu_address();
        let read = cpu.cpu_reads();

        // 2. Decode
        let decoded = self.memory.map().decode(address);
        let access = Self::chip_access(decoded, address);

        // 3. RRIOTs
        let mut response = None;
        for chip in ChipId::ALL {
            let i = chip.index();
            let mut pins = self.inputs[i];
            let selected = access.filter(|a| a.chip == chip);
            if let Some(a) = selected {
                pins = pins.with_access(a.offset, read).with(rriot::RS0, a.ram);
                if !read {
                    pins = pins.with_data(cpu.cpu_data());
                }
            }
            let out = self.rriots[i].tick(pins);
            if selected.is_some() && read {
                response = Some(out.data());
            }
            self.outputs[i] = out;
        }

        // 4. Board memory
        let data = match decoded.map(|d| d.target) {
            Some(Target::Ram | Target::Rom(_)) => {
                if read {
                    Some(self.memory.read(address))
                } else {
                    self.memory.write(address, cpu.cpu_data());
                    None
                }
            }
            Some(Target::RriotIo(_) | Target::RriotRam(_)) => response,
            None => {
                log::trace!(
                    "{} unmapped ${address:04X}",
                    if read { "read from" } else { "write to" }
                );
                None
            }
        };

        // 5. Pins for the CPU's next tick
        let mut next = cpu
            .with(cpu_pins::IRQ, self.irq())
            .with(cpu_pins::NMI, self.nmi)
            .with(cpu_pins::RDY, true)
            .with(cpu_pins::RES, false);
        if read {
            next = next.with_cpu_data(data.unwrap_or(OPEN_BUS));
        }
        self.cpu_in = next;
    }
}

impl<C: PinTickable> Observable for Kim1<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("rriot002.") {
            self.rriot(ChipId::Rriot002).query(rest)
        } else if let Some(rest) = path.strip_prefix("rriot003.") {
            self.rriot(ChipId::Rriot003).query(rest)
        } else if let Some(rest) = path.strip_prefix("cpu.") {
            match rest {
                "address" => Some(self.cpu_out.cpu_address().into()),
                "data" => Some(self.cpu_in.cpu_data().into()),
                "rw" => Some(self.cpu_out.cpu_reads().into()),
                "irq" => Some(self.cpu_in.is_high(cpu_pins::IRQ).into()),
                "nmi" => Some(self.cpu_in.is_high(cpu_pins::NMI).into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix('$')) {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.memory.peek(a)))
        } else {
            match path {
                "cycles" => Some(self.cycles.into()),
                "irq" => Some(self.irq().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "rriot002.<6530_paths>",
            "rriot003.<6530_paths>",
            "cpu.address",
            "cpu.data",
            "cpu.rw",
            "cpu.irq",
            "cpu.nmi",
            "memory.<address>",
            "cycles",
            "irq",
        ]
    }
}
