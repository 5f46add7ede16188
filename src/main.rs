#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega128a::Peripherals;
    use avr_device::interrupt::{self, Mutex};
    use core::cell::RefCell;

    use atmega128_tick_scheduler::config::{
        SchedulerConfig, CPU_FREQ_HZ, LOG_LEVEL, RELOAD_LATENCY_CYCLES, TICK_PERIOD_US,
    };
    use atmega128_tick_scheduler::drivers::SerialConsole;
    use atmega128_tick_scheduler::hal::{board::Leds, TickSource, TickTimerConfig, Timer1};
    use atmega128_tick_scheduler::logger::{LogLevel, Logger};
    use atmega128_tick_scheduler::rtos::Scheduler;
    use atmega128_tick_scheduler::tick::TickFlag;

    const TICK_CONFIG: TickTimerConfig =
        match TickTimerConfig::new(CPU_FREQ_HZ, TICK_PERIOD_US, RELOAD_LATENCY_CYCLES) {
            Ok(config) => config,
            Err(_) => panic!("TICK_PERIOD_US does not fit Timer1"),
        };

    // Raised by TIMER1_OVF, consumed by the main loop
    static TICK_FLAG: TickFlag = TickFlag::new();

    static TICK_SOURCE: Mutex<RefCell<Option<TickSource<Timer1>>>> =
        Mutex::new(RefCell::new(None));

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();

        let leds = Leds::new(dp.PORTG);
        let mut logger = Logger::new(SerialConsole::new(dp.USART0), LOG_LEVEL);
        logger.info("ATmega128 tick scheduler v0.1.0");
        logger.log_value(LogLevel::Info, "timer1 preload", &TICK_CONFIG.preload());
        logger.log_value(LogLevel::Debug, "tick period us", &TICK_CONFIG.actual_period_us());

        let mut source = TickSource::new(Timer1::new(dp.TC1), TICK_CONFIG);
        source.start();
        interrupt::free(|cs| {
            TICK_SOURCE.borrow(cs).replace(Some(source));
        });

        // Enable interrupts globally
        unsafe { interrupt::enable() };

        let mut scheduler = Scheduler::new(SchedulerConfig::DEFAULT, leds.led1, logger);
        match scheduler.run(&TICK_FLAG) {
            Ok(never) | Err(never) => match never {},
        }
    }

    #[avr_device::interrupt(atmega128a)]
    fn TIMER1_OVF() {
        interrupt::free(|cs| {
            if let Some(source) = TICK_SOURCE.borrow(cs).borrow_mut().as_mut() {
                source.on_interrupt(&TICK_FLAG);
            }
        });
    }
}

/// Host build: run the main loop against a simulated Timer1 and print the
/// LED1 edges with their virtual timestamps.
#[cfg(not(target_arch = "avr"))]
mod host {
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::io::{self, Write};
    use std::rc::Rc;

    use embedded_hal::digital::v2::OutputPin;
    use ufmt::{uWrite, uwriteln};

    use atmega128_tick_scheduler::config::{
        SchedulerConfig, CPU_FREQ_HZ, LOG_LEVEL, RELOAD_LATENCY_CYCLES, TICK_PERIOD_US,
    };
    use atmega128_tick_scheduler::hal::{TickSource, TickTimerConfig, TimerError};
    use atmega128_tick_scheduler::logger::{LogLevel, Logger};
    use atmega128_tick_scheduler::rtos::Scheduler;
    use atmega128_tick_scheduler::sim::{SimTimer, VirtualClock};
    use atmega128_tick_scheduler::tick::TickFlag;

    const SIMULATED_SECONDS: u64 = 3;
    /// Main-loop passes between two ticks
    const PASSES_PER_TICK: usize = 4;

    struct Stdout;

    impl uWrite for Stdout {
        type Error = io::Error;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            io::stdout().write_all(s.as_bytes())
        }
    }

    /// LED line whose level can be read back from outside the scheduler
    struct SharedPin(Rc<Cell<bool>>);

    impl OutputPin for SharedPin {
        type Error = Infallible;

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }
    }

    pub fn run() -> Result<(), TimerError> {
        let config = TickTimerConfig::new(CPU_FREQ_HZ, TICK_PERIOD_US, RELOAD_LATENCY_CYCLES)?;
        let mut logger = Logger::new(Stdout, LOG_LEVEL);
        logger.info("simulated ATmega128 tick scheduler");
        logger.log_value(LogLevel::Info, "timer1 preload", &config.preload());

        let flag = TickFlag::new();
        let mut source = TickSource::new(SimTimer::new(), config);
        source.start();

        let led = Rc::new(Cell::new(false));
        let mut scheduler =
            Scheduler::new(SchedulerConfig::DEFAULT, SharedPin(led.clone()), logger);

        let mut clock = VirtualClock::new(TICK_PERIOD_US);
        let mut lit = false;
        let mut out = Stdout;
        let ticks = SIMULATED_SECONDS * 1_000_000 / u64::from(TICK_PERIOD_US);

        for _ in 0..ticks {
            source.fire(&flag);
            clock.advance();
            for _ in 0..PASSES_PER_TICK {
                match scheduler.poll(&flag) {
                    Ok(_) => {}
                    Err(never) => match never {},
                }
            }

            if led.get() != lit {
                lit = led.get();
                let edge = if lit { "on" } else { "off" };
                uwriteln!(out, "{} ms: LED1 {}", clock.now_ms(), edge).ok();
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() -> std::process::ExitCode {
    match host::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}
