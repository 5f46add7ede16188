//! Configuration constants for the ATmega128 tick scheduler

use crate::logger::LogLevel;
use crate::rtos::TransitionTable;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Timer1 tick period in microseconds
pub const TICK_PERIOD_US: u32 = 50_000;

/// Ticks per coarse interval (20 x 50ms = 1s)
pub const COARSE_INTERVAL_TICKS: u16 = 20;

/// LED flash length in ticks (10 x 50ms = 0.5s)
pub const FLASH_TICKS: u16 = 10;

/// Cycles from Timer1 overflow to the TCNT1 reload inside the ISR.
/// Interrupt response (4) plus the handler prologue.
pub const RELOAD_LATENCY_CYCLES: u32 = 64;

/// Minimum level written to the console
pub const LOG_LEVEL: LogLevel = if cfg!(feature = "debug") {
    LogLevel::Debug
} else {
    LogLevel::Info
};

/// Main-loop settings for [`Scheduler`](crate::rtos::Scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Tick Counter threshold
    pub interval_ticks: u16,
    /// Flash budget armed at every coarse interval
    pub flash_ticks: u16,
    /// Next-stage table for the task dispatcher
    pub transitions: TransitionTable,
}

impl SchedulerConfig {
    pub const DEFAULT: Self = Self {
        interval_ticks: COARSE_INTERVAL_TICKS,
        flash_ticks: FLASH_TICKS,
        transitions: TransitionTable::SCAFFOLD,
    };
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
