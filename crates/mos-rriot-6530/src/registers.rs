//! Register decode and per-access side effects.
//!
//! | Reg | Name         | Read                              | Write                          |
//! |-----|--------------|-----------------------------------|--------------------------------|
//! | $0  | PRA          | port A pins, acks CA1/CA2         | outr A, acks CA1/CA2           |
//! | $1  | DDRA         | DDR A                             | DDR A                          |
//! | $2  | PRB          | port B pins, acks CB1/CB2         | outr B, acks CB1/CB2           |
//! | $3  | DDRB         | DDR B                             | DDR B                          |
//! | $4  | TIMER_LO     | counter low, acks timer           | latch low                      |
//! | $5  | TIMER_HI     | counter high                      | latch high + arm, acks timer   |
//! | $6  | LATCH_LO     | latch low                         | latch low                      |
//! | $7  | LATCH_HI     | latch high                        | latch high                     |
//! | $8  | ACR          | ACR                               | ACR                            |
//! | $9  | PCR          | PCR                               | PCR, acks independent C2 lines |
//! | $A  | IFR          | flags (bit 7 = any enabled)       | ignored                        |
//! | $B  | IER          | enable mask                       | bit 7 = set/clear              |
//! | $C  | TIMER_PEEK   | counter low, no ack               | latch low                      |
//! | $D  | PRA_NO_HS    | port A pins, no ack               | outr A, no ack                 |
//!
//! $E and $F are not decoded by the chip.

use crate::port::{C2Mode, PortId};

/// A decoded register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Pra = 0x0,
    Ddra = 0x1,
    Prb = 0x2,
    Ddrb = 0x3,
    TimerLo = 0x4,
    TimerHi = 0x5,
    LatchLo = 0x6,
    LatchHi = 0x7,
    Acr = 0x8,
    Pcr = 0x9,
    Ifr = 0xA,
    Ier = 0xB,
    TimerPeek = 0xC,
    PraNoHandshake = 0xD,
}

/// Bus direction of an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// What an access does besides moving data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    None,
    /// Clear these interrupt flags (and the matching control-line triggers).
    Acknowledge(u8),
}

impl Register {
    /// Decode A0..A3. `None` for selects the chip does not implement.
    #[must_use]
    pub const fn decode(select: u8) -> Option<Self> {
        Some(match select & 0x0F {
            0x0 => Register::Pra,
            0x1 => Register::Ddra,
            0x2 => Register::Prb,
            0x3 => Register::Ddrb,
            0x4 => Register::TimerLo,
            0x5 => Register::TimerHi,
            0x6 => Register::LatchLo,
            0x7 => Register::LatchHi,
            0x8 => Register::Acr,
            0x9 => Register::Pcr,
            0xA => Register::Ifr,
            0xB => Register::Ier,
            0xC => Register::TimerPeek,
            0xD => Register::PraNoHandshake,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Port whose C2 handshake/pulse output is strobed by this register.
    #[must_use]
    pub const fn handshake_port(self) -> Option<PortId> {
        match self {
            Register::Pra => Some(PortId::A),
            Register::Prb => Some(PortId::B),
            _ => None,
        }
    }

    /// Resolve the side effect of one access. `pcr` decides whether a C2
    /// input is independent: data accesses never acknowledge those, a PCR
    /// write does. For PCR writes `pcr` is the value just written.
    #[must_use]
    pub const fn side_effect(self, access: Access, pcr: u8) -> SideEffect {
        match (self, access) {
            (Register::Pra, _) => SideEffect::Acknowledge(port_ack(PortId::A, pcr)),
            (Register::Prb, _) => SideEffect::Acknowledge(port_ack(PortId::B, pcr)),
            (Register::TimerLo, Access::Read) | (Register::TimerHi, Access::Write) => {
                SideEffect::Acknowledge(crate::IRQ_TIMER)
            }
            (Register::Pcr, Access::Write) => {
                let flags = independent_c2(PortId::A, pcr) | independent_c2(PortId::B, pcr);
                if flags == 0 {
                    SideEffect::None
                } else {
                    SideEffect::Acknowledge(flags)
                }
            }
            _ => SideEffect::None,
        }
    }
}

const fn port_ack(port: PortId, pcr: u8) -> u8 {
    port.c1_flag() | (port.c2_flag() & !independent_c2(port, pcr))
}

/// The port's C2 flag if its C2 is an independent input, else 0.
const fn independent_c2(port: PortId, pcr: u8) -> u8 {
    match C2Mode::from_pcr_bits(port.pcr_bits(pcr)) {
        C2Mode::Input {
            independent: true, ..
        } => port.c2_flag(),
        _ => 0,
    }
}
