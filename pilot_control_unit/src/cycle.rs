//! Fixed-period loop pacing and cycle statistics.
//!
//! Each periodic loop (pre-match, operator control, telemetry) measures its
//! cycle body, then sleeps out the remainder of the period. A body that
//! outruns the period is counted as an overrun and the next cycle starts
//! immediately; there is no catch-up.

use std::time::{Duration, Instant};

use tracing::warn;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle body duration [us].
    pub last_cycle_us: u64,
    /// Minimum cycle body duration [us].
    pub min_cycle_us: u64,
    /// Maximum cycle body duration [us].
    pub max_cycle_us: u64,
    /// Running sum for average computation.
    pub sum_cycle_us: u64,
    /// Cycles whose body exceeded the period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_us: 0,
            min_cycle_us: u64::MAX,
            max_cycle_us: 0,
            sum_cycle_us: 0,
            overruns: 0,
        }
    }

    /// Record a cycle body duration.
    #[inline]
    pub fn record(&mut self, duration_us: u64) {
        self.cycle_count += 1;
        self.last_cycle_us = duration_us;
        self.min_cycle_us = self.min_cycle_us.min(duration_us);
        self.max_cycle_us = self.max_cycle_us.max(duration_us);
        self.sum_cycle_us = self.sum_cycle_us.saturating_add(duration_us);
    }

    /// Average cycle body time [us] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_us(&self) -> u64 {
        self.sum_cycle_us.checked_div(self.cycle_count).unwrap_or(0)
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Pacer ──────────────────────────────────────────────────────────

/// Paces one periodic loop.
///
/// ```ignore
/// let mut pacer = Pacer::new("operator", period);
/// while running() {
///     pacer.begin();
///     body();
///     pacer.finish();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Pacer {
    name: &'static str,
    period: Duration,
    cycle_start: Instant,
    stats: CycleStats,
}

impl Pacer {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            cycle_start: Instant::now(),
            stats: CycleStats::new(),
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Mark the start of a cycle body.
    #[inline]
    pub fn begin(&mut self) {
        self.cycle_start = Instant::now();
    }

    /// Record the body and sleep for the rest of the period.
    pub fn finish(&mut self) -> Duration {
        let elapsed = self.cycle_start.elapsed();
        self.record(elapsed);
        if elapsed < self.period {
            std::thread::sleep(self.period - elapsed);
        }
        elapsed
    }

    /// Record a body duration without sleeping.
    pub fn record(&mut self, elapsed: Duration) {
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.stats.record(elapsed_us);

        if elapsed > self.period {
            self.stats.overruns += 1;
            let overruns = self.stats.overruns;
            if overruns <= 10 || overruns % 1000 == 0 {
                warn!(
                    "{} loop overrun #{}: cycle took {}us (period {}us)",
                    self.name,
                    overruns,
                    elapsed_us,
                    self.period.as_micros()
                );
            }
        }
    }
}
