use embedded_hal::digital::v2::OutputPin;

/// Non-blocking LED pulse counted in ticks.
///
/// While armed the pin is driven high on every tick until the tick count
/// passes the budget, then driven low once and the effect disarms. A
/// disarmed effect leaves the pin alone.
pub struct LedFlash<P> {
    pin: P,
    budget: u16,
    elapsed: u16,
}

impl<P: OutputPin> LedFlash<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            budget: 0,
            elapsed: 0,
        }
    }

    /// Start a pulse of `ticks` ticks. Restarts the window if already armed.
    pub fn arm(&mut self, ticks: u16) {
        self.budget = ticks;
        self.elapsed = 0;
    }

    pub fn on_tick(&mut self) -> Result<(), P::Error> {
        if !self.is_armed() {
            return Ok(());
        }

        if self.elapsed < self.budget {
            self.elapsed += 1;
            self.pin.set_high()
        } else {
            self.budget = 0;
            self.pin.set_low()
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.budget != 0
    }

    /// Ticks left with the pin high
    pub fn remaining(&self) -> u16 {
        self.budget.saturating_sub(self.elapsed)
    }

    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction};
    use std::iter;

    fn highs(n: usize) -> impl Iterator<Item = Transaction> {
        iter::repeat(Transaction::set(State::High)).take(n)
    }

    #[test]
    fn disarmed_leaves_pin_alone() {
        let mut flash = LedFlash::new(PinMock::new(&[]));
        for _ in 0..5 {
            flash.on_tick().unwrap();
        }
        flash.release().done();
    }

    #[test]
    fn budget_of_ten_holds_high_for_ten_ticks() {
        let expectations: Vec<_> = highs(10)
            .chain(iter::once(Transaction::set(State::Low)))
            .collect();
        let mut flash = LedFlash::new(PinMock::new(&expectations));

        flash.arm(10);
        for _ in 0..10 {
            flash.on_tick().unwrap();
            assert!(flash.is_armed());
        }
        flash.on_tick().unwrap();
        assert!(!flash.is_armed());

        // Disarmed: further ticks touch nothing
        flash.on_tick().unwrap();
        flash.release().done();
    }

    #[test]
    fn rearm_restarts_window() {
        // 5 ticks, re-arm, then a fresh 10-tick window
        let expectations: Vec<_> = highs(15)
            .chain(iter::once(Transaction::set(State::Low)))
            .collect();
        let mut flash = LedFlash::new(PinMock::new(&expectations));

        flash.arm(10);
        for _ in 0..5 {
            flash.on_tick().unwrap();
        }
        assert_eq!(flash.remaining(), 5);

        flash.arm(10);
        assert_eq!(flash.remaining(), 10);
        for _ in 0..10 {
            flash.on_tick().unwrap();
        }
        flash.on_tick().unwrap();
        assert!(!flash.is_armed());
        flash.release().done();
    }

    #[test]
    fn max_budget_still_runs_out() {
        let expectations: Vec<_> = highs(usize::from(u16::MAX))
            .chain(iter::once(Transaction::set(State::Low)))
            .collect();
        let mut flash = LedFlash::new(PinMock::new(&expectations));

        flash.arm(u16::MAX);
        for _ in 0..u16::MAX {
            flash.on_tick().unwrap();
        }
        assert!(flash.is_armed());
        assert_eq!(flash.remaining(), 0);

        flash.on_tick().unwrap();
        assert!(!flash.is_armed());
        flash.on_tick().unwrap();
        flash.release().done();
    }

    #[test]
    fn arm_zero_is_disarm() {
        let mut flash = LedFlash::new(PinMock::new(&[]));
        flash.arm(0);
        assert!(!flash.is_armed());
        flash.on_tick().unwrap();
        flash.release().done();
    }
}
