pub mod led_flash;
#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use led_flash::LedFlash;
#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
