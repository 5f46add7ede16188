//! Timer1-driven cooperative scheduler for the ATmega128
//!
//! The overflow interrupt raises a [`TickFlag`](tick::TickFlag) every tick
//! period. The main loop ([`Scheduler`](rtos::Scheduler)) consumes it, counts
//! ticks into a coarse interval, steps a single-slot task through its stages
//! and times a non-blocking LED flash.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod config;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod rtos;
pub mod sim;
pub mod tick;
