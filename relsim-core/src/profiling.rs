//! Tracy profiling support.
//!
//! With the `tracy` feature enabled, `tracing` spans from the turn phases
//! and mechanisms are reported to Tracy. Without it every function here is
//! a no-op.
//!
//! ## Usage
//!
//! 1. Build with `--features tracy`
//! 2. Call [`init_tracy()`] early in main
//! 3. Connect the Tracy GUI or capture tool
//!
//! Each universe turn ends with a [`frame_mark_turn`] marker.

/// Trace level for Tracy profiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceLevel {
    /// Turn phases only
    #[default]
    Info,
    /// Adds per-mechanism spans
    Debug,
    /// Everything, including per-player AI spans
    Trace,
}

impl std::str::FromStr for TraceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(TraceLevel::Info),
            "debug" => Ok(TraceLevel::Debug),
            "trace" => Ok(TraceLevel::Trace),
            _ => Err(format!(
                "Invalid trace level: {}. Use info, debug, or trace.",
                s
            )),
        }
    }
}

/// Install the Tracy tracing subscriber.
///
/// Must be called before any span is created.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
#[cfg(feature = "tracy")]
pub fn init_tracy(level: TraceLevel) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let filter = match level {
        TraceLevel::Info => LevelFilter::INFO,
        TraceLevel::Debug => LevelFilter::DEBUG,
        TraceLevel::Trace => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_tracy::TracyLayer::default())
        .with(filter)
        .init();
}

#[cfg(not(feature = "tracy"))]
pub fn init_tracy(_level: TraceLevel) {}

/// Mark the end of a universe turn in Tracy's timeline.
#[cfg(feature = "tracy")]
#[inline]
pub fn frame_mark_turn() {
    tracy_client::secondary_frame_mark!("turn");
}

#[cfg(not(feature = "tracy"))]
#[inline]
pub fn frame_mark_turn() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_parsing() {
        assert_eq!("INFO".parse::<TraceLevel>(), Ok(TraceLevel::Info));
        assert_eq!("debug".parse::<TraceLevel>(), Ok(TraceLevel::Debug));
        assert_eq!("Trace".parse::<TraceLevel>(), Ok(TraceLevel::Trace));
        assert!("verbose".parse::<TraceLevel>().is_err());
    }
}
