//! Level-filtered debug logging seam.
//!
//! Mirrors the original firmware's `debug_lvl()` gate: callers log at one of
//! three levels and the sink decides whether the message is emitted. Where
//! the message ultimately goes (UART, RTT, stdout) is out of scope for this
//! crate — [`DebugSink`] only states the filtering contract. Concrete sinks
//! live behind the `hardware`/`defmt` and `std` features.

/// Debug verbosity levels, ordered from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebugLevel {
    /// Errors only: malformed frames, queue overflow, rejected commands.
    Err,
    /// Informational: mode switches, boot milestones.
    Info,
    /// Everything, including per-command tracing.
    Verbose,
}

/// A level-filtered log sink.
///
/// `log` is expected to be cheap to call even when filtered out — callers
/// do not gate calls behind `is_enabled` themselves.
pub trait DebugSink {
    /// The sink's own configured filter level.
    fn level(&self) -> DebugLevel;

    /// Emit a message if `level <= self.level()`.
    fn log(&self, level: DebugLevel, message: &str);

    /// Whether a message at the given level would be emitted.
    fn is_enabled(&self, level: DebugLevel) -> bool {
        level <= self.level()
    }
}

/// A sink that discards everything. Used where logging is wired up but no
/// concrete destination has been chosen (e.g. unit tests of components that
/// take a `DebugSink` but don't assert on log output).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn level(&self) -> DebugLevel {
        DebugLevel::Err
    }

    fn log(&self, _level: DebugLevel, _message: &str) {}
}

/// A [`DebugSink`] that forwards to `tracing`, for desktop/emulator builds.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: DebugLevel,
}

#[cfg(feature = "std")]
impl TracingSink {
    /// A sink that forwards everything up to and including `level`.
    pub const fn new(level: DebugLevel) -> Self {
        Self { level }
    }
}

#[cfg(feature = "std")]
impl DebugSink for TracingSink {
    fn level(&self) -> DebugLevel {
        self.level
    }

    fn log(&self, level: DebugLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        match level {
            DebugLevel::Err => tracing::error!("{message}"),
            DebugLevel::Info => tracing::info!("{message}"),
            DebugLevel::Verbose => tracing::trace!("{message}"),
        }
    }
}

/// A [`DebugSink`] that forwards to `defmt`, for on-target hardware builds.
#[cfg(feature = "defmt")]
#[derive(Debug, Clone, Copy)]
pub struct DefmtSink {
    level: DebugLevel,
}

#[cfg(feature = "defmt")]
impl DefmtSink {
    /// A sink that forwards everything up to and including `level`.
    pub const fn new(level: DebugLevel) -> Self {
        Self { level }
    }
}

#[cfg(feature = "defmt")]
impl DebugSink for DefmtSink {
    fn level(&self) -> DebugLevel {
        self.level
    }

    fn log(&self, level: DebugLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        match level {
            DebugLevel::Err => defmt::error!("{=str}", message),
            DebugLevel::Info => defmt::info!("{=str}", message),
            DebugLevel::Verbose => defmt::trace!("{=str}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_matches_verbosity() {
        assert!(DebugLevel::Err < DebugLevel::Info);
        assert!(DebugLevel::Info < DebugLevel::Verbose);
    }

    #[test]
    fn null_sink_reports_err_only() {
        let sink = NullSink;
        assert!(sink.is_enabled(DebugLevel::Err));
        assert!(!sink.is_enabled(DebugLevel::Info));
    }

    #[cfg(feature = "std")]
    #[test]
    fn tracing_sink_respects_configured_level() {
        let sink = TracingSink::new(DebugLevel::Info);
        assert!(sink.is_enabled(DebugLevel::Info));
        assert!(!sink.is_enabled(DebugLevel::Verbose));
        sink.log(DebugLevel::Info, "boot complete");
    }
}
