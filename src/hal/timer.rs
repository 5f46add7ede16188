//! Timer1 tick source
//!
//! Timer1 counts up from a preload value and raises TIMER1_OVF when it wraps
//! past 0xFFFF. The handler reloads TCNT1 so the next overflow lands one tick
//! period later. The reload happens some cycles after the actual wrap, so the
//! preload is nudged forward by that latency expressed in timer counts.

use core::fmt;

use crate::tick::TickFlag;

/// 16-bit counter range
const COUNTER_SPAN: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    /// Candidates tried when fitting a period, finest first
    const RUNNING: [Prescaler; 5] = [
        Prescaler::Direct,
        Prescaler::Div8,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Stop => 0,
            Prescaler::Direct => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// CS12:0 clock select bits
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Period rounds to no counts, or to no more than the reload latency
    PeriodTooShort,
    /// Period overflows the 16-bit counter even at the largest prescaler
    PeriodTooLong,
}

impl TimerError {
    const fn message(self) -> &'static str {
        match self {
            TimerError::PeriodTooShort => "tick period too short for Timer1",
            TimerError::PeriodTooLong => "tick period too long for Timer1",
        }
    }
}

impl ufmt::uDisplay for TimerError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.message())
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Prescaler and preload for a fixed tick period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimerConfig {
    prescaler: Prescaler,
    preload: u16,
    cpu_hz: u32,
}

impl TickTimerConfig {
    /// Fit `period_us` into Timer1 at `cpu_hz`, using the finest prescaler
    /// that does not overflow the counter.
    pub const fn new(cpu_hz: u32, period_us: u32, latency_cycles: u32) -> Result<Self, TimerError> {
        let mut i = 0;
        while i < Prescaler::RUNNING.len() {
            let prescaler = Prescaler::RUNNING[i];
            let divisor = prescaler.divisor() as u64;
            let counts = cpu_hz as u64 * period_us as u64 / (divisor * 1_000_000);
            if counts <= COUNTER_SPAN as u64 {
                let correction = latency_cycles as u64 / divisor;
                if counts == 0 || counts <= correction {
                    return Err(TimerError::PeriodTooShort);
                }
                let preload = COUNTER_SPAN as u64 - (counts - correction);
                return Ok(Self {
                    prescaler,
                    preload: preload as u16,
                    cpu_hz,
                });
            }
            i += 1;
        }
        Err(TimerError::PeriodTooLong)
    }

    #[inline]
    pub const fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Value written to TCNT1 on every overflow
    #[inline]
    pub const fn preload(&self) -> u16 {
        self.preload
    }

    /// Timer counts from preload to overflow
    pub const fn counts(&self) -> u32 {
        COUNTER_SPAN - self.preload as u32
    }

    /// Period between overflows as counted by the timer, excluding the
    /// reload latency the preload compensates for.
    pub const fn actual_period_us(&self) -> u32 {
        let counts = self.counts() as u64 * self.prescaler.divisor() as u64;
        (counts * 1_000_000 / self.cpu_hz as u64) as u32
    }
}

/// Register-level operations the tick source needs from a timer peripheral.
pub trait TickTimer {
    /// Clear the overflow pending indicator
    fn clear_pending(&mut self);
    /// Write the 16-bit count register
    fn reload(&mut self, preload: u16);
    /// Select the clock and enable the overflow interrupt
    fn start(&mut self, prescaler: Prescaler);
}

/// Periodic tick generator driven from the overflow interrupt.
pub struct TickSource<T> {
    timer: T,
    config: TickTimerConfig,
}

impl<T: TickTimer> TickSource<T> {
    pub fn new(timer: T, config: TickTimerConfig) -> Self {
        Self { timer, config }
    }

    /// Load the first preload and start counting.
    pub fn start(&mut self) {
        self.timer.reload(self.config.preload());
        self.timer.clear_pending();
        self.timer.start(self.config.prescaler());
    }

    /// Overflow handler body. Order matters: the pending bit is cleared once,
    /// the counter is reloaded as early as possible, then the tick is published.
    #[inline]
    pub fn on_interrupt(&mut self, flag: &TickFlag) {
        self.timer.clear_pending();
        self.timer.reload(self.config.preload());
        flag.raise();
    }

    pub fn config(&self) -> &TickTimerConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

}

#[cfg(target_arch = "avr")]
pub use avr::Timer1;

#[cfg(target_arch = "avr")]
mod avr {
    use super::{Prescaler, TickTimer};
    use avr_device::atmega128a::TC1;

    /// TOIE1 in TIMSK, TOV1 in TIFR
    const TOV1_MASK: u8 = 1 << 2;

    /// ATmega128 16-bit Timer1 in normal mode
    pub struct Timer1 {
        tc1: TC1,
    }

    impl Timer1 {
        pub fn new(tc1: TC1) -> Self {
            // Normal mode, clock stopped
            tc1.tccr1a.write(|w| unsafe { w.bits(0) });
            tc1.tccr1b.write(|w| unsafe { w.bits(0) });
            Self { tc1 }
        }
    }

    impl TickTimer for Timer1 {
        #[inline]
        fn clear_pending(&mut self) {
            // TOV1 is cleared by writing a one
            self.tc1.tifr.write(|w| unsafe { w.bits(TOV1_MASK) });
        }

        #[inline]
        fn reload(&mut self, preload: u16) {
            // 16-bit write goes through TEMP, high byte first
            self.tc1.tcnt1.write(|w| unsafe { w.bits(preload) });
        }

        fn start(&mut self, prescaler: Prescaler) {
            self.tc1
                .timsk
                .modify(|r, w| unsafe { w.bits(r.bits() | TOV1_MASK) });
            self.tc1
                .tccr1b
                .modify(|r, w| unsafe { w.bits((r.bits() & !0x07) | prescaler.bits()) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimTimer;

    #[test]
    fn fifty_ms_at_16mhz() {
        let config = TickTimerConfig::new(16_000_000, 50_000, 0).unwrap();
        // 16MHz / 64 = 250kHz, 12500 counts
        assert_eq!(config.prescaler(), Prescaler::Div64);
        assert_eq!(config.counts(), 12_500);
        assert_eq!(config.preload(), 53_036);
        assert_eq!(config.actual_period_us(), 50_000);
    }

    #[test]
    fn latency_shortens_the_count() {
        let config = TickTimerConfig::new(16_000_000, 50_000, 128).unwrap();
        assert_eq!(config.preload(), 53_036 + 2);
        assert_eq!(config.counts(), 12_498);
    }

    #[test]
    fn fifty_ms_at_20mhz() {
        let config = TickTimerConfig::new(20_000_000, 50_000, 0).unwrap();
        assert_eq!(config.prescaler(), Prescaler::Div64);
        // 20MHz / 64 = 312.5kHz, 15625 counts
        assert_eq!(config.counts(), 15_625);
        assert_eq!(config.preload(), 49_911);
    }

    #[test]
    fn short_period_uses_direct_clock() {
        let config = TickTimerConfig::new(16_000_000, 1_000, 0).unwrap();
        assert_eq!(config.prescaler(), Prescaler::Direct);
        assert_eq!(config.counts(), 16_000);
    }

    #[test]
    fn rejects_unrepresentable_periods() {
        assert_eq!(
            TickTimerConfig::new(16_000_000, 10_000_000, 0),
            Err(TimerError::PeriodTooLong)
        );
        assert_eq!(
            TickTimerConfig::new(16_000_000, 0, 0),
            Err(TimerError::PeriodTooShort)
        );
        // 1us = 16 cycles, fully eaten by the latency
        assert_eq!(
            TickTimerConfig::new(16_000_000, 1, 16),
            Err(TimerError::PeriodTooShort)
        );
    }

    #[test]
    fn error_displays_message() {
        let mut text = String::new();
        use core::fmt::Write;
        write!(text, "{}", TimerError::PeriodTooLong).unwrap();
        assert_eq!(text, "tick period too long for Timer1");
    }

    #[test]
    fn start_loads_preload_and_enables() {
        let config = TickTimerConfig::new(16_000_000, 50_000, 0).unwrap();
        let mut source = TickSource::new(SimTimer::new(), config);
        source.start();

        let timer = source.timer();
        assert_eq!(timer.counter(), 53_036);
        assert_eq!(timer.prescaler(), Some(Prescaler::Div64));
        assert!(!timer.is_pending());
        assert_eq!(timer.reloads(), 1);
    }

    #[test]
    fn interrupt_clears_reloads_and_raises() {
        let config = TickTimerConfig::new(16_000_000, 50_000, 0).unwrap();
        let mut source = TickSource::new(SimTimer::new(), config);
        let flag = TickFlag::new();
        source.start();

        for firing in 1..=3 {
            source.timer.overflow();
            assert!(source.timer().is_pending());

            source.on_interrupt(&flag);

            assert!(!source.timer().is_pending());
            assert_eq!(source.timer().counter(), 53_036);
            assert_eq!(source.timer().reloads(), 1 + firing);
            assert_eq!(source.timer().clears(), 1 + firing);
            assert!(flag.take());
        }
    }
}
