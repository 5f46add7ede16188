use avr_device::atmega128a::PORTG;
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::OutputPin;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// One bit of PORTG
#[derive(Debug)]
pub struct Pin<const PIN: u8, MODE> {
    _mode: PhantomData<MODE>,
}

#[inline]
fn port() -> &'static avr_device::atmega128a::portg::RegisterBlock {
    unsafe { &*PORTG::ptr() }
}

impl<const P: u8, MODE: PinMode> Pin<P, MODE> {
    pub fn into_output(self) -> Pin<P, Output> {
        // Drive low before switching direction
        port().portg.modify(|r, w| unsafe { w.bits(r.bits() & !(1 << P)) });
        port().ddrg.modify(|r, w| unsafe { w.bits(r.bits() | (1 << P)) });
        Pin { _mode: PhantomData }
    }
}

impl<const P: u8> Pin<P, Input> {
    fn new() -> Self {
        Pin { _mode: PhantomData }
    }
}

impl<const P: u8> OutputPin for Pin<P, Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        port().portg.modify(|r, w| unsafe { w.bits(r.bits() | (1 << P)) });
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        port().portg.modify(|r, w| unsafe { w.bits(r.bits() & !(1 << P)) });
        Ok(())
    }
}

// Board pin definitions
pub mod board {
    use super::*;

    /// RG3, red
    pub type Led1 = Pin<3, Output>;
    /// RG4, yellow
    pub type Led2 = Pin<4, Output>;

    pub struct Leds {
        pub led1: Led1,
        pub led2: Led2,
    }

    impl Leds {
        /// Take PORTG and configure both LED lines as outputs, driven low.
        pub fn new(_portg: PORTG) -> Self {
            Self {
                led1: Pin::<3, Input>::new().into_output(),
                led2: Pin::<4, Input>::new().into_output(),
            }
        }
    }
}
