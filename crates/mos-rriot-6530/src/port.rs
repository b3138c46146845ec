//! I/O ports A and B with their C1/C2 control lines.
//!
//! Each pin is driven by the chip when its DDR bit is 1 and sampled from
//! outside when it is 0. The two control lines per port are edge detectors
//! (C1 always, C2 when configured as an input); C2 can also be an output
//! with handshake, pulse or fixed-level behaviour.

use crate::pipeline::DelayLine;

/// Which of the two ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortId {
    A,
    B,
}

impl PortId {
    /// Interrupt flag raised by this port's C1 line.
    #[must_use]
    pub const fn c1_flag(self) -> u8 {
        match self {
            PortId::A => crate::IRQ_CA1,
            PortId::B => crate::IRQ_CB1,
        }
    }

    /// Interrupt flag raised by this port's C2 line.
    #[must_use]
    pub const fn c2_flag(self) -> u8 {
        match self {
            PortId::A => crate::IRQ_CA2,
            PortId::B => crate::IRQ_CB2,
        }
    }

    /// This port's nibble of the peripheral control register.
    #[must_use]
    pub const fn pcr_bits(self, pcr: u8) -> u8 {
        match self {
            PortId::A => pcr & 0x0F,
            PortId::B => pcr >> 4,
        }
    }
}

/// C2 behaviour, from PCR bits 3-1 (port A) or 7-5 (port B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2Mode {
    /// Edge-detecting input. `independent` inputs are not acknowledged by
    /// data register accesses.
    Input { rising: bool, independent: bool },
    /// Output: low after a data register access, high again on the next C1
    /// active edge.
    Handshake,
    /// Output: low for the one tick after a data register access.
    Pulse,
    Low,
    High,
}

impl C2Mode {
    /// Decode from a port's PCR nibble.
    #[must_use]
    pub const fn from_pcr_bits(bits: u8) -> Self {
        match (bits >> 1) & 0x07 {
            0b000 => C2Mode::Input { rising: false, independent: false },
            0b001 => C2Mode::Input { rising: false, independent: true },
            0b010 => C2Mode::Input { rising: true, independent: false },
            0b011 => C2Mode::Input { rising: true, independent: true },
            0b100 => C2Mode::Handshake,
            0b101 => C2Mode::Pulse,
            0b110 => C2Mode::Low,
            _ => C2Mode::High,
        }
    }

    #[must_use]
    pub const fn is_output(self) -> bool {
        !matches!(self, C2Mode::Input { .. })
    }
}

/// One control line.
///
/// In edge mode `triggered` is set once per qualifying edge. In level mode
/// it is set on every tick the line sits at its active level, so it comes
/// straight back after an acknowledgment while the line is still held.
/// Either way it stays set until a CPU access acknowledges it; time alone
/// never clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlLine {
    /// Level seen on the previous tick.
    pub input: bool,
    /// Level driven when the line is an output. Idles high.
    pub output: bool,
    pub triggered: bool,
}

impl ControlLine {
    const fn new() -> Self {
        Self {
            input: false,
            output: true,
            triggered: false,
        }
    }

    /// Latch the new level; true if the line fires this tick.
    ///
    /// `rising` picks the polarity: the rising edge or high level when set,
    /// the falling edge or low level when clear.
    fn sample(&mut self, level: bool, rising: bool, level_triggered: bool) -> bool {
        let fired = if level_triggered {
            level == rising
        } else if rising {
            !self.input && level
        } else {
            self.input && !level
        };
        self.input = level;
        if fired {
            self.triggered = true;
        }
        fired
    }
}

/// Edges detected on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortEvents {
    pub c1: bool,
    pub c2: bool,
}

/// External state of a port on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInputs {
    pub pins: u8,
    pub c1: bool,
    pub c2: bool,
}

/// One 8-bit I/O port.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Port {
    /// Input latch: external pin levels as last captured.
    inpr: u8,
    /// Output register.
    outr: u8,
    /// Data direction register (1 = output).
    ddr: u8,
    c1: ControlLine,
    c2: ControlLine,
    /// Returns C2 high after a pulse-mode strobe.
    c2_release: DelayLine<2>,
}

impl Port {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inpr: 0,
            outr: 0,
            ddr: 0,
            c1: ControlLine::new(),
            c2: ControlLine::new(),
            c2_release: DelayLine::new(),
        }
    }

    /// Clear registers and control-line state. The input latch is kept: it
    /// is re-sampled on the next tick anyway.
    pub fn reset(&mut self) {
        self.outr = 0;
        self.ddr = 0;
        self.c1.triggered = false;
        self.c1.output = true;
        self.c2.triggered = false;
        self.c2.output = true;
        self.c2_release.cancel();
    }

    /// Sample external pins and control lines for this tick.
    ///
    /// `pcr_bits` is this port's PCR nibble. With `latching` set, the input
    /// latch only captures when C1 fires. With `level_triggered` set, C1 and
    /// C2 inputs fire on every tick they sit at their active level.
    pub fn sample(
        &mut self,
        inputs: PortInputs,
        pcr_bits: u8,
        latching: bool,
        level_triggered: bool,
    ) -> PortEvents {
        if self.c2_release.is_due() {
            self.c2.output = true;
        }

        let c1_rising = pcr_bits & 0x01 != 0;
        let c1 = self.c1.sample(inputs.c1, c1_rising, level_triggered);
        if !latching || c1 {
            self.inpr = inputs.pins;
        }

        let mode = C2Mode::from_pcr_bits(pcr_bits);
        let c2 = match mode {
            C2Mode::Input { rising, .. } => self.c2.sample(inputs.c2, rising, level_triggered),
            _ => {
                self.c2.input = inputs.c2;
                false
            }
        };
        if c1 && mode == C2Mode::Handshake {
            self.c2.output = true;
        }

        PortEvents { c1, c2 }
    }

    /// CPU touched the data register with handshaking: strobe C2 if it is a
    /// handshake or pulse output.
    pub fn strobe(&mut self, pcr_bits: u8) {
        match C2Mode::from_pcr_bits(pcr_bits) {
            C2Mode::Handshake => self.c2.output = false,
            C2Mode::Pulse => {
                self.c2.output = false;
                self.c2_release.schedule(1);
            }
            _ => {}
        }
    }

    /// Clear the triggered flags named in `flags` for this port.
    pub fn acknowledge(&mut self, id: PortId, flags: u8) {
        if flags & id.c1_flag() != 0 {
            self.c1.triggered = false;
        }
        if flags & id.c2_flag() != 0 {
            self.c2.triggered = false;
        }
    }

    /// Value seen by a data register read: output bits from `outr`, input
    /// bits from the input latch.
    #[must_use]
    pub const fn read(&self) -> u8 {
        (self.outr & self.ddr) | (self.inpr & !self.ddr)
    }

    /// Data register write. Only bits configured as outputs change.
    pub fn write(&mut self, value: u8) {
        self.outr = (self.outr & !self.ddr) | (value & self.ddr);
    }

    pub fn write_ddr(&mut self, value: u8) {
        self.ddr = value;
    }

    /// Pin levels to put back on the bus: driven bits from `outr`, the rest
    /// passed through from `external`.
    #[must_use]
    pub const fn drive(&self, external: u8) -> u8 {
        (self.outr & self.ddr) | (external & !self.ddr)
    }

    /// Level to drive on C2, or `None` when C2 is an input.
    #[must_use]
    pub const fn c2_drive(&self, pcr_bits: u8) -> Option<bool> {
        match C2Mode::from_pcr_bits(pcr_bits) {
            C2Mode::Input { .. } => None,
            C2Mode::Handshake | C2Mode::Pulse => Some(self.c2.output),
            C2Mode::Low => Some(false),
            C2Mode::High => Some(true),
        }
    }

    /// End-of-tick pipeline advance.
    pub fn advance(&mut self) {
        self.c2_release.advance();
    }

    #[must_use]
    pub const fn inpr(&self) -> u8 {
        self.inpr
    }

    #[must_use]
    pub const fn outr(&self) -> u8 {
        self.outr
    }

    #[must_use]
    pub const fn ddr(&self) -> u8 {
        self.ddr
    }

    #[must_use]
    pub const fn c1(&self) -> &ControlLine {
        &self.c1
    }

    #[must_use]
    pub const fn c2(&self) -> &ControlLine {
        &self.c2
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::new()
    }
}
