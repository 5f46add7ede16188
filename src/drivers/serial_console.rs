use crate::hal::uart::Uart;
use avr_device::atmega128a::USART0;
use core::convert::Infallible;
use ufmt::uWrite;

/// Log sink on USART0
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new(usart: USART0) -> Self {
        Self {
            uart: Uart::new(usart),
        }
    }
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.uart.write_str(s);
        Ok(())
    }
}
