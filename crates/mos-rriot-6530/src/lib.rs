//! MOS 6530 RRIOT (RAM, I/O, Timer), driven through a 64-bit pin mask.
//!
//! The KIM-1 uses two of these (6530-002 and 6530-003) for its keyboard,
//! display, and tape interface. Each chip has two 8-bit I/O ports with
//! C1/C2 control lines, a 16-bit timer, an interrupt flag/enable pair, and
//! 64 bytes of static RAM.
//!
//! # Usage
//!
//! Every cycle the machine builds a [`Pins`] mask (address, RW, data,
//! chip-select, port inputs, control lines) and calls [`Rriot6530::tick`].
//! The returned mask carries the chip's outputs: port pins, C2 when it is an
//! output, IRQ, and the data bus on a selected read. Everything else comes
//! back untouched.
//!
//! # Tick order
//!
//! 1. Sample port pins and control lines; detect C1/C2 edges.
//! 2. Step the timer; underflow raises the timer flag.
//! 3. Perform the register or RAM access, if selected.
//! 4. Drive port pins, C2 outputs, IRQ, and (on reads) the data bus.
//! 5. Advance the delay pipelines.
//!
//! See [`registers`] for the register map.

pub mod interrupt;
pub mod pins;
pub mod pipeline;
pub mod port;
pub mod registers;
pub mod timer;

use emu_core::{Observable, PinTickable, Pins, Value};

use crate::interrupt::InterruptUnit;
use crate::pins::{CA1, CA2, CB1, CB2, IRQ, RriotPins};
use crate::port::{Port, PortId, PortInputs};
use crate::registers::{Access, Register, SideEffect};
use crate::timer::{Prescale, Timer, TimerMode};

// IFR/IER bit masks
pub const IRQ_CA2: u8 = 0x01;
pub const IRQ_CA1: u8 = 0x02;
pub const IRQ_CB2: u8 = 0x08;
pub const IRQ_CB1: u8 = 0x10;
pub const IRQ_TIMER: u8 = 0x40;

/// Bytes of on-chip static RAM.
pub const RAM_SIZE: usize = 64;

// ACR bits
const ACR_PA_LEVEL: u8 = 0x08;
const ACR_PA_LATCH: u8 = 0x10;
const ACR_PB_LATCH: u8 = 0x20;
const ACR_PB_LEVEL: u8 = 0x40;
const ACR_PB7_TIMER: u8 = 0x80;

/// MOS 6530 RRIOT.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rriot6530 {
    /// Port A with its CA1/CA2 control lines.
    pa: Port,
    /// Port B with its CB1/CB2 control lines.
    pb: Port,
    /// Interval timer.
    timer: Timer,
    /// IFR/IER and the one-tick IRQ output delay.
    intr: InterruptUnit,
    /// Auxiliary control register.
    /// Bit 7: PB7 driven by the timer toggle bit
    /// Bit 6: CB1/CB2 inputs level-triggered
    /// Bit 5: PB input latching on CB1
    /// Bit 4: PA input latching on CA1
    /// Bit 3: CA1/CA2 inputs level-triggered
    /// Bits 2-1: timer prescaler (/1, /8, /64, /1024)
    /// Bit 0: timer free-running (1) or one-shot (0)
    acr: u8,
    /// Peripheral control register.
    /// Bits 7-5: CB2 control
    /// Bit 4: CB1 edge (0 = falling, 1 = rising)
    /// Bits 3-1: CA2 control
    /// Bit 0: CA1 edge (0 = falling, 1 = rising)
    ///
    /// In level mode the edge bits pick the active level instead
    /// (0 = low, 1 = high).
    pcr: u8,
    /// On-chip static RAM, [`RAM_SIZE`] bytes.
    ram: Vec<u8>,
}

impl Rriot6530 {
    /// Create a chip in its reset state with zeroed RAM.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pa: Port::new(),
            pb: Port::new(),
            timer: Timer::new(),
            intr: InterruptUnit::new(),
            acr: 0,
            pcr: 0,
            ram: vec![0; RAM_SIZE],
        }
    }

    /// Clear DDRs, output registers, interrupt registers, control registers
    /// and the timer. Input latches and RAM survive.
    pub fn reset(&mut self) {
        self.pa.reset();
        self.pb.reset();
        self.timer.reset();
        self.intr.reset();
        self.acr = 0;
        self.pcr = 0;
    }

    /// Advance one cycle.
    ///
    /// # Panics
    ///
    /// On a selected register access to $E or $F, which the chip does not
    /// decode. The machine's address map must not route such accesses here.
    pub fn tick(&mut self, pins: Pins) -> Pins {
        if pins.is_reset() {
            self.reset();
            return self.drive(pins);
        }

        self.sample(pins);

        if self
            .timer
            .step(TimerMode::from_acr(self.acr), Prescale::from_acr(self.acr))
        {
            self.intr.raise(IRQ_TIMER);
        }

        let data = if pins.is_selected() {
            self.access(pins)
        } else {
            None
        };
        let out = self.drive(data.map_or(pins, |data| pins.with_data(data)));

        self.pa.advance();
        self.pb.advance();
        self.timer.advance();
        self.intr.advance();

        out
    }

    fn sample(&mut self, pins: Pins) {
        let pa_inputs = PortInputs {
            pins: pins.port_a(),
            c1: pins.is_high(CA1),
            c2: pins.is_high(CA2),
        };
        let pb_inputs = PortInputs {
            pins: pins.port_b(),
            c1: pins.is_high(CB1),
            c2: pins.is_high(CB2),
        };

        let events = self.pa.sample(
            pa_inputs,
            PortId::A.pcr_bits(self.pcr),
            self.acr & ACR_PA_LATCH != 0,
            self.acr & ACR_PA_LEVEL != 0,
        );
        if events.c1 {
            self.intr.raise(IRQ_CA1);
        }
        if events.c2 {
            self.intr.raise(IRQ_CA2);
        }

        let events = self.pb.sample(
            pb_inputs,
            PortId::B.pcr_bits(self.pcr),
            self.acr & ACR_PB_LATCH != 0,
            self.acr & ACR_PB_LEVEL != 0,
        );
        if events.c1 {
            self.intr.raise(IRQ_CB1);
        }
        if events.c2 {
            self.intr.raise(IRQ_CB2);
        }
    }

    /// Selected bus access. Returns the byte to drive on a read.
    fn access(&mut self, pins: Pins) -> Option<u8> {
        if pins.is_ram_select() {
            let offset = pins.ram_offset();
            return if pins.is_read() {
                Some(self.ram[offset])
            } else {
                self.ram[offset] = pins.data();
                None
            };
        }

        let select = pins.register_select();
        let Some(reg) = Register::decode(select) else {
            panic!("6530 register select ${select:X} is not decoded by the chip");
        };
        let access = if pins.is_read() {
            Access::Read
        } else {
            Access::Write
        };

        let data = match access {
            Access::Read => Some(self.read(reg)),
            Access::Write => {
                self.write(reg, pins.data());
                None
            }
        };

        if let SideEffect::Acknowledge(flags) = reg.side_effect(access, self.pcr) {
            self.acknowledge(flags);
        }
        if let Some(port) = reg.handshake_port() {
            let pcr_bits = port.pcr_bits(self.pcr);
            match port {
                PortId::A => self.pa.strobe(pcr_bits),
                PortId::B => self.pb.strobe(pcr_bits),
            }
        }

        data
    }

    fn read(&self, reg: Register) -> u8 {
        match reg {
            Register::Pra | Register::PraNoHandshake => self.pa.read(),
            Register::Ddra => self.pa.ddr(),
            Register::Prb => self.port_b_value(self.pb.read()),
            Register::Ddrb => self.pb.ddr(),
            Register::TimerLo | Register::TimerPeek => self.timer.counter() as u8,
            Register::TimerHi => (self.timer.counter() >> 8) as u8,
            Register::LatchLo => self.timer.latch() as u8,
            Register::LatchHi => (self.timer.latch() >> 8) as u8,
            Register::Acr => self.acr,
            Register::Pcr => self.pcr,
            Register::Ifr => self.intr.read_flags(),
            Register::Ier => self.intr.ier(),
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        match reg {
            Register::Pra | Register::PraNoHandshake => self.pa.write(value),
            Register::Ddra => self.pa.write_ddr(value),
            Register::Prb => self.pb.write(value),
            Register::Ddrb => self.pb.write_ddr(value),
            Register::TimerLo | Register::LatchLo | Register::TimerPeek => {
                self.timer.write_latch_lo(value);
            }
            Register::TimerHi => self.timer.arm(value),
            Register::LatchHi => self.timer.write_latch_hi(value),
            Register::Acr => self.acr = value,
            Register::Pcr => self.pcr = value,
            // Read-only.
            Register::Ifr => {}
            Register::Ier => self.intr.write_enable(value),
        }
    }

    fn acknowledge(&mut self, flags: u8) {
        self.intr.acknowledge(flags);
        self.pa.acknowledge(PortId::A, flags);
        self.pb.acknowledge(PortId::B, flags);
    }

    /// PB7 follows the timer toggle bit when ACR bit 7 is set.
    fn port_b_value(&self, value: u8) -> u8 {
        if self.acr & ACR_PB7_TIMER != 0 {
            (value & 0x7F) | if self.timer.toggle() { 0x80 } else { 0 }
        } else {
            value
        }
    }

    /// Put the chip's outputs on the mask.
    fn drive(&self, pins: Pins) -> Pins {
        let pa = self.pa.drive(pins.port_a());
        let pb = self.port_b_value(self.pb.drive(pins.port_b()));
        let mut out = pins.with_ports(pa, pb).with(IRQ, self.intr.irq());
        if let Some(level) = self.pa.c2_drive(PortId::A.pcr_bits(self.pcr)) {
            out.set(CA2, level);
        }
        if let Some(level) = self.pb.c2_drive(PortId::B.pcr_bits(self.pcr)) {
            out.set(CB2, level);
        }
        out
    }

    /// Check if the IRQ output is asserted this tick.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.intr.irq()
    }

    #[must_use]
    pub fn port_a(&self) -> &Port {
        &self.pa
    }

    #[must_use]
    pub fn port_b(&self) -> &Port {
        &self.pb
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Interrupt enable register.
    #[must_use]
    pub fn ier(&self) -> u8 {
        self.intr.ier()
    }

    /// Interrupt flag register (without the bit 7 summary).
    #[must_use]
    pub fn ifr(&self) -> u8 {
        self.intr.ifr()
    }

    #[must_use]
    pub fn acr(&self) -> u8 {
        self.acr
    }

    #[must_use]
    pub fn pcr(&self) -> u8 {
        self.pcr
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Preload RAM (power-on patterns, snapshots). Extra bytes are ignored.
    pub fn load_ram(&mut self, data: &[u8]) {
        let len = data.len().min(RAM_SIZE);
        self.ram[..len].copy_from_slice(&data[..len]);
    }
}

impl Default for Rriot6530 {
    fn default() -> Self {
        Self::new()
    }
}

impl PinTickable for Rriot6530 {
    fn tick(&mut self, pins: Pins) -> Pins {
        Rriot6530::tick(self, pins)
    }

    fn reset(&mut self) {
        Rriot6530::reset(self);
    }
}

impl Observable for Rriot6530 {
    fn query(&self, path: &str) -> Option<Value> {
        let port = |p: &Port, rest: &str| -> Option<Value> {
            match rest {
                "inpr" => Some(p.inpr().into()),
                "outr" => Some(p.outr().into()),
                "ddr" => Some(p.ddr().into()),
                "c1.triggered" => Some(p.c1().triggered.into()),
                "c2.triggered" => Some(p.c2().triggered.into()),
                "c2.out" => Some(p.c2().output.into()),
                _ => None,
            }
        };

        if let Some(rest) = path.strip_prefix("pa.") {
            if rest == "pins" {
                return Some(self.pa.read().into());
            }
            port(&self.pa, rest)
        } else if let Some(rest) = path.strip_prefix("pb.") {
            if rest == "pins" {
                return Some(self.port_b_value(self.pb.read()).into());
            }
            port(&self.pb, rest)
        } else if let Some(rest) = path.strip_prefix("timer.") {
            match rest {
                "latch" => Some(self.timer.latch().into()),
                "counter" => Some(self.timer.counter().into()),
                "toggle" => Some(self.timer.toggle().into()),
                "pulse" => Some(self.timer.pulse().into()),
                "active" => Some(self.timer.is_active().into()),
                _ => None,
            }
        } else {
            match path {
                "acr" => Some(self.acr.into()),
                "pcr" => Some(self.pcr.into()),
                "ier" => Some(self.intr.ier().into()),
                "ifr" => Some(self.intr.read_flags().into()),
                "irq" => Some(self.intr.irq().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pa.pins",
            "pa.inpr",
            "pa.outr",
            "pa.ddr",
            "pa.c1.triggered",
            "pa.c2.triggered",
            "pa.c2.out",
            "pb.pins",
            "pb.inpr",
            "pb.outr",
            "pb.ddr",
            "pb.c1.triggered",
            "pb.c2.triggered",
            "pb.c2.out",
            "timer.latch",
            "timer.counter",
            "timer.toggle",
            "timer.pulse",
            "timer.active",
            "acr",
            "pcr",
            "ier",
            "ifr",
            "irq",
        ]
    }
}
