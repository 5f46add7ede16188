//! Cooperative main loop driven by the Timer1 tick
//!
//! Each pass observes the tick flag at most once, advances the coarse
//! interval counter, runs one task stage and steps the LED flash. Nothing in
//! a pass waits, so the loop always gets back to the flag within one pass.

use embedded_hal::digital::v2::OutputPin;
use ufmt::uWrite;

use crate::config::SchedulerConfig;
use crate::drivers::LedFlash;
use crate::logger::{LogLevel, Logger};
use crate::rtos::task::{Dispatcher, StageWork, TaskStage};
use crate::tick::{TickCounter, TickFlag};

/// What happened during one main-loop pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pass {
    /// A tick was pending and has been consumed
    pub ticked: bool,
    /// The coarse interval elapsed on this pass
    pub interval_elapsed: bool,
    /// Stage whose work ran this pass
    pub stage_run: Option<TaskStage>,
}

pub struct Scheduler<P, W, S = ()> {
    interval: TickCounter,
    dispatcher: Dispatcher<S>,
    flash: LedFlash<P>,
    flash_ticks: u16,
    logger: Logger<W>,
    intervals: u32,
}

impl<P, W> Scheduler<P, W, ()>
where
    P: OutputPin,
    W: uWrite,
{
    pub fn new(config: SchedulerConfig, led: P, logger: Logger<W>) -> Self {
        Self::with_work(config, led, logger, ())
    }
}

impl<P, W, S> Scheduler<P, W, S>
where
    P: OutputPin,
    W: uWrite,
    S: StageWork,
{
    pub fn with_work(config: SchedulerConfig, led: P, logger: Logger<W>, work: S) -> Self {
        Self {
            interval: TickCounter::new(config.interval_ticks),
            dispatcher: Dispatcher::with_work(config.transitions, work),
            flash: LedFlash::new(led),
            flash_ticks: config.flash_ticks,
            logger,
            intervals: 0,
        }
    }

    /// Run one pass of the main loop.
    pub fn poll(&mut self, flag: &TickFlag) -> Result<Pass, P::Error> {
        let mut pass = Pass {
            ticked: flag.take(),
            ..Pass::default()
        };

        if pass.ticked && self.interval.on_tick() {
            pass.interval_elapsed = true;
            self.start_interval();
        }

        pass.stage_run = self.dispatcher.poll();

        if pass.ticked {
            self.flash.on_tick()?;
        }

        Ok(pass)
    }

    /// Poll forever.
    pub fn run(&mut self, flag: &TickFlag) -> Result<core::convert::Infallible, P::Error> {
        self.logger.info("scheduler running");
        loop {
            self.poll(flag)?;
        }
    }

    fn start_interval(&mut self) {
        self.intervals = self.intervals.wrapping_add(1);
        self.logger
            .log_value(LogLevel::Debug, "interval", &self.intervals);

        if let Some(stage) = self.dispatcher.trigger() {
            self.logger
                .log_value(LogLevel::Warn, "task preempted at", &stage);
        }
        self.flash.arm(self.flash_ticks);
    }

    /// Coarse intervals seen since start
    pub fn intervals(&self) -> u32 {
        self.intervals
    }

    pub fn stage(&self) -> TaskStage {
        self.dispatcher.stage()
    }

    pub fn ticks_into_interval(&self) -> u16 {
        self.interval.count()
    }

    pub fn flash(&self) -> &LedFlash<P> {
        &self.flash
    }

    pub fn logger(&self) -> &Logger<W> {
        &self.logger
    }

    pub fn work(&self) -> &S {
        self.dispatcher.work()
    }

    /// Give back the LED pin.
    pub fn release(self) -> P {
        self.flash.release()
    }
}
