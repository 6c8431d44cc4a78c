//! Engine time.
//!
//! Game time is a 32-bit count of milliseconds that wraps after about
//! 49.7 days. [`Clock`] produces it from the monotonic system clock;
//! [`PerfTimer`] measures and accumulates short spans for profiling.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock relative to its creation.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    base: Instant,
}

impl Clock {
    /// Start a clock reading zero now.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created, wrapping at `u32::MAX`.
    pub fn milliseconds(&self) -> u32 {
        // Truncation is the wrap.
        self.base.elapsed().as_millis() as u32
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

static PROCESS_CLOCK: OnceLock<Clock> = OnceLock::new();

/// Milliseconds since the first call in this process.
///
/// The first call returns (approximately) zero.
pub fn milliseconds() -> u32 {
    PROCESS_CLOCK.get_or_init(Clock::new).milliseconds()
}

/// Stopwatch that keeps a running total across start/stop pairs.
#[derive(Debug, Default)]
pub struct PerfTimer {
    started: Option<Instant>,
    total: Duration,
}

impl PerfTimer {
    /// Create a stopped timer with a zero total.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the current span.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// End the current span, add it to the total, and return it.
    ///
    /// Returns [`Duration::ZERO`] if the timer was not started.
    pub fn stop(&mut self) -> Duration {
        let Some(started) = self.started.take() else {
            return Duration::ZERO;
        };
        let elapsed = started.elapsed();
        self.total += elapsed;
        tracing::debug!(secs = elapsed.as_secs_f64(), "span finished");
        elapsed
    }

    /// Sum of every completed span.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Whether a span is in progress.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clock_starts_near_zero_and_advances() {
        let clock = Clock::new();
        let first = clock.milliseconds();
        assert!(first < 1000);
        thread::sleep(Duration::from_millis(5));
        assert!(clock.milliseconds() >= first + 5);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = Clock::new();
        let mut last = clock.milliseconds();
        for _ in 0..1000 {
            let now = clock.milliseconds();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn process_clock_is_shared() {
        let a = milliseconds();
        let b = milliseconds();
        assert!(b >= a);
    }

    #[test]
    fn stop_without_start_is_zero() {
        let mut timer = PerfTimer::new();
        assert_eq!(timer.stop(), Duration::ZERO);
        assert_eq!(timer.total(), Duration::ZERO);
    }

    #[test]
    fn total_accumulates_spans() {
        let mut timer = PerfTimer::new();
        timer.start();
        assert!(timer.is_running());
        thread::sleep(Duration::from_millis(2));
        let first = timer.stop();
        assert!(!timer.is_running());
        timer.start();
        thread::sleep(Duration::from_millis(2));
        let second = timer.stop();
        assert!(first >= Duration::from_millis(2));
        assert_eq!(timer.total(), first + second);
    }
}
