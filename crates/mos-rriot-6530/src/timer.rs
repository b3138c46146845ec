//! 16-bit interval timer with load and start latency.
//!
//! Arming the timer (a write to the high byte) does not touch the counter
//! on the same cycle. The force load lands one tick later, and the counter
//! starts decrementing two ticks after the load. For a reload value `L`
//! armed on tick `T`, underflow therefore happens on tick `T + L + 3`.
//!
//! Underflow is the 0 -> $FFFF transition. It flips the toggle bit and
//! raises the one-tick pulse. Free-running mode reloads the latch on the
//! following tick and keeps counting (period `L + 2`); one-shot mode stops
//! and holds $FFFF until the timer is armed again.

use crate::pipeline::DelayLine;

/// ACR bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    OneShot,
    FreeRunning,
}

impl TimerMode {
    #[must_use]
    pub const fn from_acr(acr: u8) -> Self {
        if acr & 0x01 != 0 {
            TimerMode::FreeRunning
        } else {
            TimerMode::OneShot
        }
    }
}

/// ACR bits 2-1: ticks per counter decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prescale {
    Div1,
    Div8,
    Div64,
    Div1024,
}

impl Prescale {
    #[must_use]
    pub const fn from_acr(acr: u8) -> Self {
        match (acr >> 1) & 0x03 {
            0 => Prescale::Div1,
            1 => Prescale::Div8,
            2 => Prescale::Div64,
            _ => Prescale::Div1024,
        }
    }

    #[must_use]
    pub const fn divisor(self) -> u16 {
        match self {
            Prescale::Div1 => 1,
            Prescale::Div8 => 8,
            Prescale::Div64 => 64,
            Prescale::Div1024 => 1024,
        }
    }
}

/// Timer state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timer {
    /// Reload value.
    latch: u16,
    /// Live counter.
    counter: u16,
    /// Flips on every underflow.
    toggle: bool,
    /// High for the single tick on which the counter underflowed.
    pulse: bool,
    /// Counter decrements while set.
    active: bool,
    /// Ticks left in the current prescaler period.
    prescaler: u16,
    /// 1-tick force load of `latch` into `counter`.
    load: DelayLine<2>,
    /// 2-tick delay between a load and the counter going active.
    start: DelayLine<3>,
}

impl Timer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latch: 0,
            counter: 0,
            toggle: false,
            pulse: false,
            active: false,
            prescaler: 0,
            load: DelayLine::new(),
            start: DelayLine::new(),
        }
    }

    /// Idle: counter and latch zero, nothing pending, toggle cleared.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Set the latch low byte. Does not arm.
    pub fn write_latch_lo(&mut self, value: u8) {
        self.latch = (self.latch & 0xFF00) | u16::from(value);
    }

    /// Set the latch high byte. Does not arm.
    pub fn write_latch_hi(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(value) << 8);
    }

    /// Set the latch high byte and (re)arm: stop counting, force a load on
    /// the next tick, start counting two ticks after that.
    pub fn arm(&mut self, hi: u8) {
        self.write_latch_hi(hi);
        self.active = false;
        self.start.cancel();
        self.load.cancel();
        self.load.schedule(1);
    }

    /// Advance one tick. Returns true on the underflow tick.
    pub fn step(&mut self, mode: TimerMode, prescale: Prescale) -> bool {
        self.pulse = false;

        if self.start.is_due() {
            self.active = true;
            self.prescaler = prescale.divisor() - 1;
        }

        let mut underflow = false;
        if self.active {
            if self.prescaler == 0 {
                self.prescaler = prescale.divisor() - 1;
                let (next, wrapped) = self.counter.overflowing_sub(1);
                self.counter = next;
                underflow = wrapped;
            } else {
                self.prescaler -= 1;
            }
        }

        if underflow {
            self.toggle = !self.toggle;
            self.pulse = true;
            match mode {
                TimerMode::FreeRunning => self.load.schedule(1),
                TimerMode::OneShot => self.active = false,
            }
        }

        if self.load.is_due() {
            self.counter = self.latch;
            // A reload while counting keeps counting; a load after arming
            // starts the activation delay.
            if !self.active {
                self.start.schedule(2);
            }
        }

        underflow
    }

    /// End-of-tick pipeline advance.
    pub fn advance(&mut self) {
        self.load.advance();
        self.start.advance();
    }

    #[must_use]
    pub const fn latch(&self) -> u16 {
        self.latch
    }

    #[must_use]
    pub const fn counter(&self) -> u16 {
        self.counter
    }

    #[must_use]
    pub const fn toggle(&self) -> bool {
        self.toggle
    }

    #[must_use]
    pub const fn pulse(&self) -> bool {
        self.pulse
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run one full tick the way the chip does, returning the underflow flag.
    fn tick(timer: &mut Timer, mode: TimerMode) -> bool {
        let underflow = timer.step(mode, Prescale::Div1);
        timer.advance();
        underflow
    }

    /// Arm on "tick 0": the write happens after that tick's timer step.
    fn armed(latch: u16) -> Timer {
        let mut timer = Timer::new();
        timer.step(TimerMode::OneShot, Prescale::Div1);
        timer.write_latch_lo(latch as u8);
        timer.arm((latch >> 8) as u8);
        timer.advance();
        timer
    }

    #[test]
    fn arming_does_not_touch_counter() {
        let mut timer = Timer::new();
        timer.write_latch_lo(0x34);
        timer.arm(0x12);
        assert_eq!(timer.latch(), 0x1234);
        assert_eq!(timer.counter(), 0);
    }

    #[test]
    fn load_then_two_tick_start() {
        let mut timer = armed(9);
        tick(&mut timer, TimerMode::OneShot); // tick 1: load
        assert_eq!(timer.counter(), 9);
        tick(&mut timer, TimerMode::OneShot); // tick 2: idle
        assert_eq!(timer.counter(), 9);
        tick(&mut timer, TimerMode::OneShot); // tick 3: first decrement
        assert_eq!(timer.counter(), 8);
    }

    #[test]
    fn one_shot_underflows_on_tick_twelve_for_nine() {
        let mut timer = armed(9);
        let underflows: Vec<u32> = (1..=100)
            .filter(|_| tick(&mut timer, TimerMode::OneShot))
            .collect();
        assert_eq!(underflows, vec![12]);
        assert_eq!(timer.counter(), 0xFFFF);
        assert!(timer.toggle());
    }

    #[test]
    fn free_running_period_is_latch_plus_two() {
        let mut timer = armed(4);
        let underflows: Vec<u32> = (1..=30)
            .filter(|_| tick(&mut timer, TimerMode::FreeRunning))
            .collect();
        assert_eq!(underflows, vec![7, 13, 19, 25]);
    }

    #[test]
    fn free_running_reloads_latch_after_underflow() {
        let mut timer = armed(2);
        for _ in 0..5 {
            tick(&mut timer, TimerMode::FreeRunning);
        }
        assert_eq!(timer.counter(), 0xFFFF);
        assert!(timer.pulse());
        tick(&mut timer, TimerMode::FreeRunning);
        assert_eq!(timer.counter(), 2);
        assert!(!timer.pulse());
    }

    #[test]
    fn toggle_flips_each_underflow() {
        let mut timer = armed(0);
        let mut toggles = Vec::new();
        for _ in 0..8 {
            if tick(&mut timer, TimerMode::FreeRunning) {
                toggles.push(timer.toggle());
            }
        }
        assert_eq!(toggles, vec![true, false, true]);
    }

    #[test]
    fn prescaler_slows_counting() {
        let mut timer = armed(1);
        let underflows: Vec<u32> = (1..=40)
            .filter(|_| {
                let underflow = timer.step(TimerMode::OneShot, Prescale::Div8);
                timer.advance();
                underflow
            })
            .collect();
        // Active on tick 3; decrements on ticks 10 and 18.
        assert_eq!(underflows, vec![18]);
    }

    #[test]
    fn rearm_mid_count_restarts_delay() {
        let mut timer = armed(100);
        for _ in 0..10 {
            tick(&mut timer, TimerMode::OneShot);
        }
        assert!(timer.is_active());
        timer.step(TimerMode::OneShot, Prescale::Div1);
        timer.write_latch_lo(3);
        timer.arm(0);
        timer.advance();
        assert!(!timer.is_active());
        let underflows: Vec<u32> = (1..=20)
            .filter(|_| tick(&mut timer, TimerMode::OneShot))
            .collect();
        assert_eq!(underflows, vec![6]);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut timer = armed(5);
        for _ in 0..20 {
            tick(&mut timer, TimerMode::FreeRunning);
        }
        timer.reset();
        assert_eq!(timer, Timer::new());
        for _ in 0..10 {
            assert!(!tick(&mut timer, TimerMode::FreeRunning));
        }
        assert_eq!(timer.counter(), 0);
    }

    #[test]
    fn prescale_decode() {
        assert_eq!(Prescale::from_acr(0b000), Prescale::Div1);
        assert_eq!(Prescale::from_acr(0b010), Prescale::Div8);
        assert_eq!(Prescale::from_acr(0b100), Prescale::Div64);
        assert_eq!(Prescale::from_acr(0b110), Prescale::Div1024);
        assert_eq!(Prescale::Div1024.divisor(), 1024);
    }
}
