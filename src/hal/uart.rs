//! Interrupt-driven USART0 transmitter
//!
//! Bytes go into a ring buffer drained by the UDRE interrupt, so writing never
//! waits on the line. When the buffer is full the byte is dropped.

use avr_device::atmega128a::USART0;
use avr_device::interrupt::Mutex;
use core::cell::RefCell;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

// Buffer size must be power of 2 for efficient masking
const BUFFER_SIZE: usize = 64;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const TXEN: u8 = 1 << 3;
const UDRIE: u8 = 1 << 5;
/// 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0x06;

struct Buffer {
    data: [u8; BUFFER_SIZE],
    write_idx: usize,
    read_idx: usize,
}

impl Buffer {
    const fn new() -> Self {
        Self {
            data: [0; BUFFER_SIZE],
            write_idx: 0,
            read_idx: 0,
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        let next_write = (self.write_idx + 1) & BUFFER_MASK;
        if next_write != self.read_idx {
            self.data[self.write_idx] = byte;
            self.write_idx = next_write;
            true
        } else {
            false
        }
    }

    fn read(&mut self) -> Option<u8> {
        if self.read_idx != self.write_idx {
            let byte = self.data[self.read_idx];
            self.read_idx = (self.read_idx + 1) & BUFFER_MASK;
            Some(byte)
        } else {
            None
        }
    }
}

static TX_BUFFER: Mutex<RefCell<Buffer>> = Mutex::new(RefCell::new(Buffer::new()));

pub struct Uart {
    usart: USART0,
}

impl Uart {
    pub fn new(usart: USART0) -> Self {
        usart.ubrr0h.write(|w| unsafe { w.bits((UBRR >> 8) as u8) });
        usart.ubrr0l.write(|w| unsafe { w.bits(UBRR as u8) });
        usart.ucsr0c.write(|w| unsafe { w.bits(UCSZ_8N1) });
        usart.ucsr0b.write(|w| unsafe { w.bits(TXEN) });
        Self { usart }
    }

    /// Queue a byte. Returns `false` if the buffer was full.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        let queued =
            avr_device::interrupt::free(|cs| TX_BUFFER.borrow(cs).borrow_mut().write(byte));
        // Kick the transmitter; UDRE fires straight away if the data register is empty
        self.usart
            .ucsr0b
            .modify(|r, w| unsafe { w.bits(r.bits() | UDRIE) });
        queued
    }

    pub fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }
}

#[avr_device::interrupt(atmega128a)]
fn USART0_UDRE() {
    avr_device::interrupt::free(|cs| {
        // SAFETY: USART0 is only touched here and by `Uart`, which masks this
        // handler via `interrupt::free` while it holds the buffer.
        let usart = unsafe { &*USART0::ptr() };
        if let Some(byte) = TX_BUFFER.borrow(cs).borrow_mut().read() {
            usart.udr0.write(|w| unsafe { w.bits(byte) });
        } else {
            // Buffer empty - disable TX interrupt
            usart
                .ucsr0b
                .modify(|r, w| unsafe { w.bits(r.bits() & !UDRIE) });
        }
    });
}
