//! Console logging over any `ufmt` writer
//!
//! Lines look like `[INF] tick source started: 53036`. Output is best effort:
//! a sink that fails to write loses the line and nothing else happens.

use core::convert::Infallible;
use ufmt::{uDisplay, uWrite, uwrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    const fn tag(self) -> &'static str {
        match self {
            LogLevel::Error => "[ERR] ",
            LogLevel::Warn => "[WRN] ",
            LogLevel::Info => "[INF] ",
            LogLevel::Debug => "[DBG] ",
        }
    }
}

/// Discards everything written to it
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl uWrite for NullSink {
    type Error = Infallible;

    fn write_str(&mut self, _s: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct Logger<W> {
    sink: W,
    level: LogLevel,
}

impl<W: uWrite> Logger<W> {
    pub fn new(sink: W, level: LogLevel) -> Self {
        Self { sink, level }
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn log(&mut self, level: LogLevel, msg: &str) {
        if !self.enabled(level) {
            return;
        }
        uwrite!(self.sink, "{}{}\r\n", level.tag(), msg).ok();
    }

    /// `msg: value`
    pub fn log_value<T: uDisplay + ?Sized>(&mut self, level: LogLevel, msg: &str, value: &T) {
        if !self.enabled(level) {
            return;
        }
        uwrite!(self.sink, "{}{}: {}\r\n", level.tag(), msg, value).ok();
    }

    pub fn error(&mut self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn warn(&mut self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn info(&mut self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn debug(&mut self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn release(self) -> W {
        self.sink
    }
}

impl Logger<NullSink> {
    pub fn disabled() -> Self {
        Self::new(NullSink, LogLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Buffer(String);

    impl uWrite for Buffer {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn writes_tagged_lines() {
        let mut logger = Logger::new(Buffer::default(), LogLevel::Info);
        logger.info("ready");
        logger.log_value(LogLevel::Warn, "preload", &53036u16);

        assert_eq!(logger.sink().0, "[INF] ready\r\n[WRN] preload: 53036\r\n");
    }

    #[test]
    fn filters_below_level() {
        let mut logger = Logger::new(Buffer::default(), LogLevel::Warn);
        logger.debug("hidden");
        logger.info("hidden");
        logger.error("shown");

        assert_eq!(logger.release().0, "[ERR] shown\r\n");
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);

        let logger = Logger::disabled();
        assert!(logger.enabled(LogLevel::Error));
        assert!(!logger.enabled(LogLevel::Warn));
    }
}
