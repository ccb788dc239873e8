//! Logger bootstrap plus small helpers for rate-limited diagnostics.
//!
//! Perception runs every frame, so most warnings must be emitted once or at
//! most once per window. [`Throttle`] and [`WarnOnce`] keep that bookkeeping
//! next to the call-site instead of in global statics.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, all debug messages are printed. Otherwise only
/// info level and above are shown.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
}

/// Gate that opens at most once per `interval` seconds of tick time.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: f64,
    last: Option<f64>,
}

impl Throttle {
    /// Creates a gate that opens immediately and then once per `interval`.
    #[must_use]
    pub const fn new(interval: f64) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` and arms the gate when `now` is outside the window.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn set_interval(&mut self, interval: f64) {
        self.interval = interval;
    }
}

/// Latch for messages that should appear a single time per owner.
#[derive(Debug, Clone, Default)]
pub struct WarnOnce {
    fired: bool,
}

impl WarnOnce {
    /// Returns `true` the first time it is called.
    pub fn first(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn throttle_opens_once_per_window() {
        let mut gate = Throttle::new(5.0);
        assert!(gate.ready(0.0));
        assert!(!gate.ready(4.9));
        assert!(gate.ready(5.0));
        assert!(!gate.ready(7.0));
    }

    #[rstest]
    fn widened_interval_applies_to_the_open_window() {
        let mut gate = Throttle::new(1.0);
        assert!(gate.ready(0.0));
        gate.set_interval(3.0);
        assert!(!gate.ready(2.0));
        assert!(gate.ready(3.0));
    }

    #[rstest]
    fn warn_once_fires_a_single_time() {
        let mut latch = WarnOnce::default();
        assert!(!latch.has_fired());
        assert!(latch.first());
        assert!(!latch.first());
        assert!(latch.has_fired());
    }

    #[rstest]
    fn init_can_be_called_twice() {
        init(false);
        init(true);
    }
}
