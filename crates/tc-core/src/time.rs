//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  Every
//! agent's task is advanced exactly once per tick by the scheduler, so the
//! tick is also the unit of the cooperative scheduling model: nothing in the
//! engine suspends mid-tick.
//!
//! The mapping to simulated seconds is held in `SimClock`:
//!
//!   elapsed_ms = tick * tick_duration_ms
//!
//! Using an integer tick as the canonical time unit means the cover cache
//! TTL arithmetic is exact (no floating-point drift) and comparisons are O(1).
//! The default tick duration is 50 ms (20 ticks per simulated second).

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero when
    /// `earlier` is actually later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated milliseconds one tick represents.  Default: 50.
    pub tick_duration_ms: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SimClock {
    /// Create a clock at tick 0 with the given resolution.
    pub fn new(tick_duration_ms: u32) -> Self {
        Self {
            tick_duration_ms: tick_duration_ms.max(1),
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Simulated seconds covered by one tick.
    #[inline]
    pub fn tick_secs(&self) -> f32 {
        self.tick_duration_ms as f32 / 1000.0
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_duration_ms as f64 / 1000.0
    }

    /// How many ticks span `secs` seconds? (rounds up so a TTL never
    /// expires early)
    #[inline]
    pub fn ticks_for_secs(&self, secs: f32) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        (secs as f64 * 1000.0 / self.tick_duration_ms as f64).ceil() as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed_secs())
    }
}
