#[cfg(target_arch = "avr")]
pub mod gpio;
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(target_arch = "avr")]
pub use gpio::board;
#[cfg(target_arch = "avr")]
pub use timer::Timer1;
pub use timer::{Prescaler, TickSource, TickTimer, TickTimerConfig, TimerError};
#[cfg(target_arch = "avr")]
pub use uart::Uart;
