//! Host-side stand-ins for Timer1 and wall-clock time.
//!
//! Nothing here touches hardware. Tests and the host build fire the tick
//! source by calling [`TickSource::on_interrupt`](crate::hal::TickSource::on_interrupt)
//! directly and advance a [`VirtualClock`] by one period per firing.

use crate::hal::timer::{Prescaler, TickSource, TickTimer};
use crate::tick::TickFlag;

/// Register model of a 16-bit overflow timer
#[derive(Debug, Default, Clone)]
pub struct SimTimer {
    counter: u16,
    pending: bool,
    prescaler: Option<Prescaler>,
    reloads: u32,
    clears: u32,
}

impl SimTimer {
    pub const fn new() -> Self {
        Self {
            counter: 0,
            pending: false,
            prescaler: None,
            reloads: 0,
            clears: 0,
        }
    }

    /// Counter wrapped past 0xFFFF: set the pending indicator.
    pub fn overflow(&mut self) {
        self.counter = 0;
        self.pending = true;
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn prescaler(&self) -> Option<Prescaler> {
        self.prescaler
    }

    /// Number of count register writes
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Number of pending-indicator clears
    pub fn clears(&self) -> u32 {
        self.clears
    }
}

impl TickTimer for SimTimer {
    fn clear_pending(&mut self) {
        self.pending = false;
        self.clears += 1;
    }

    fn reload(&mut self, preload: u16) {
        self.counter = preload;
        self.reloads += 1;
    }

    fn start(&mut self, prescaler: Prescaler) {
        self.prescaler = Some(prescaler);
    }
}

impl TickSource<SimTimer> {
    /// Overflow the timer and run the interrupt handler.
    pub fn fire(&mut self, flag: &TickFlag) {
        self.timer_mut().overflow();
        self.on_interrupt(flag);
    }
}

/// Elapsed time derived from a tick count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualClock {
    period_us: u32,
    ticks: u64,
}

impl VirtualClock {
    pub const fn new(period_us: u32) -> Self {
        Self { period_us, ticks: 0 }
    }

    /// Move forward one tick period.
    pub fn advance(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn now_us(&self) -> u64 {
        self.ticks * u64::from(self.period_us)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::TickTimerConfig;

    #[test]
    fn clock_tracks_periods() {
        let mut clock = VirtualClock::new(50_000);
        for _ in 0..20 {
            clock.advance();
        }
        assert_eq!(clock.ticks(), 20);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn timer_records_register_traffic() {
        let mut timer = SimTimer::new();
        timer.reload(0x85EE);
        timer.start(Prescaler::Div8);
        timer.overflow();
        assert!(timer.is_pending());
        assert_eq!(timer.counter(), 0);

        timer.clear_pending();
        assert!(!timer.is_pending());
        assert_eq!(timer.reloads(), 1);
        assert_eq!(timer.clears(), 1);
        assert_eq!(timer.prescaler(), Some(Prescaler::Div8));
    }

    #[test]
    fn fire_runs_the_handler() {
        let config = TickTimerConfig::new(16_000_000, 50_000, 0).unwrap();
        let mut source = TickSource::new(SimTimer::new(), config);
        let flag = TickFlag::new();

        source.fire(&flag);
        assert!(flag.take());
        assert!(!source.timer().is_pending());
        assert_eq!(source.timer().counter(), config.preload());
    }
}
