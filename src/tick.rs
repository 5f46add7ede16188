//! Tick handoff between the Timer1 interrupt and the main loop

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

/// Single-bit mailbox raised by the timer interrupt and cleared by the main loop.
///
/// Exactly one producer (the overflow ISR) and one consumer (the main loop)
/// touch the flag. Raising it again before the consumer clears it is the same
/// as raising it once: ticks are not queued, so a pass that runs longer than a
/// tick period loses the extra ticks.
///
/// AVR has no compare-and-swap, so [`take`](Self::take) is a load followed by a
/// store. A raise landing between the two is coalesced with the one just
/// observed, which is the same outcome as a late observation.
pub struct TickFlag {
    raised: AtomicBool,
}

impl TickFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Signal a tick. Interrupt context only.
    #[inline]
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Read and clear. Returns `true` if a tick was pending.
    #[inline]
    pub fn take(&self) -> bool {
        if self.raised.load(Ordering::Acquire) {
            self.raised.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Non-blocking variant of [`take`](Self::take).
    pub fn poll(&self) -> nb::Result<(), Infallible> {
        if self.take() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Peek without clearing.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a coarse interval from the fixed hardware tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter {
    count: u16,
    threshold: u16,
}

impl TickCounter {
    /// A threshold of zero behaves like a threshold of one.
    pub const fn new(threshold: u16) -> Self {
        Self {
            count: 0,
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    /// Count one observed tick. Returns `true` when the coarse interval
    /// elapsed, in which case the counter is back at zero.
    pub fn on_tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.threshold {
            self.count = 0;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn count(&self) -> u16 {
        self.count
    }

    #[inline]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }
}
