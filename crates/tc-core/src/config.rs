//! Engine configuration.
//!
//! Every struct here has a `Default` matching the tuning the engine was
//! designed around, so applications only override what they need.  With the
//! `serde` feature the structs deserialize with per-field defaults, which
//! lets a JSON config name just the fields it changes.

use std::str::FromStr;

use crate::{CoreError, CoreResult, SimClock};

// ── DistanceRange ─────────────────────────────────────────────────────────────

/// An inclusive `[min, max]` distance constraint.
///
/// `max = None` is "unbounded".  For the self range the tasks interpret an
/// unbounded max as "the whole distance between the agent and its target".
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceRange {
    pub min: f32,
    pub max: Option<f32>,
}

impl DistanceRange {
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max: Some(max) }
    }

    #[inline]
    pub const fn unbounded(min: f32) -> Self {
        Self { min, max: None }
    }

    #[inline]
    pub fn min_sq(&self) -> f32 {
        self.min * self.min
    }

    #[inline]
    pub fn max_sq(&self) -> Option<f32> {
        self.max.map(|m| m * m)
    }

    /// Is a squared distance inside the range?
    #[inline]
    pub fn contains_sq(&self, sq: f32) -> bool {
        sq >= self.min_sq() && self.max_sq().is_none_or(|max| sq <= max)
    }

    /// Parse a task parameter value.
    ///
    /// Accepts `"min,max"` or a bare `"max"`; in the latter case `min` falls
    /// back to `default_min`.  A negative max means unbounded.
    pub fn parse(value: &str, default_min: f32) -> CoreResult<Self> {
        let parse_f32 = |s: &str| {
            s.trim()
                .parse::<f32>()
                .map_err(|e| CoreError::Parse(format!("invalid distance '{}': {e}", s.trim())))
        };

        let (min, max) = match value.split_once(',') {
            Some((min, max)) => (parse_f32(min)?, parse_f32(max)?),
            None => (default_min, parse_f32(value)?),
        };

        let range = Self {
            min,
            max: (max >= 0.0).then_some(max),
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.min.is_finite() || self.min < 0.0 {
            return Err(CoreError::Config(format!("minimum distance {} must be >= 0", self.min)));
        }
        if let Some(max) = self.max {
            if !max.is_finite() || max < self.min {
                return Err(CoreError::Config(format!(
                    "maximum distance {max} is below minimum {}",
                    self.min
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for DistanceRange {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        DistanceRange::parse(s, 0.0)
    }
}

// ── Oracle inputs ─────────────────────────────────────────────────────────────

/// How strict the cover validity test is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoverStrictness {
    /// Torso-height line of fire is blocked.
    #[default]
    Basic,
    /// Torso-height blocked *and* eye-height clear, so the agent can watch
    /// the threat from cover.
    Peeking,
}

/// Vertical offsets above a cover cell's floor at which line of fire is
/// tested.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyOffsets {
    pub torso: f32,
    pub eye: f32,
}

impl BodyOffsets {
    #[inline]
    pub const fn new(torso: f32, eye: f32) -> Self {
        Self { torso, eye }
    }
}

impl Default for BodyOffsets {
    fn default() -> Self {
        Self::new(0.5, 1.6)
    }
}

// ── Task tuning ───────────────────────────────────────────────────────────────

/// Tuning for the area-search task.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoveToCoverConfig {
    /// Distance from the agent a cover cell may lie at.  Default `[0, 40]`:
    /// beyond 40 agents effectively lose sight of their target.
    pub self_distance: DistanceRange,

    /// Distance from the threat a cover cell may lie at.  Default `[5, 34]`:
    /// close enough to keep engaging, far enough not to oscillate with a
    /// back-off behaviour.
    pub target_distance: DistanceRange,

    /// Validity test applied to candidates and to already-held cover.
    pub strictness: CoverStrictness,

    /// Squared distance the agent may drift from held cover before the
    /// cover is considered abandoned.
    pub drift_tolerance_sq: f32,

    /// Torso offset above the cover cell floor.
    pub torso_offset: f32,

    /// Try to reuse a known, unheld table entry before a fresh spiral scan.
    pub reuse_existing_cover: bool,
}

impl Default for MoveToCoverConfig {
    fn default() -> Self {
        Self {
            self_distance:        DistanceRange::new(0.0, 40.0),
            target_distance:      DistanceRange::new(5.0, 34.0),
            strictness:           CoverStrictness::Basic,
            drift_tolerance_sq:   3.0,
            torso_offset:         0.5,
            reuse_existing_cover: true,
        }
    }
}

/// Tuning for the path-integrated task.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TakeCoverConfig {
    /// The task only starts when the agent is farther than this (squared)
    /// from the threat.
    pub start_min_sq: f32,

    /// The task aborts once the agent closes within this (squared) distance.
    pub abort_sq: f32,

    /// Squared distance to the cover point that counts as arrived.
    pub arrival_sq: f32,

    /// Length of each compass cast.
    pub cast_distance: f32,

    /// Distance past the threat the initial rough path aims for.
    pub initial_path_offset: f32,

    /// Waypoints that must yield a candidate before one is selected.
    /// Repeat hits on an already buffered cell count towards it.
    pub candidate_buffer: usize,

    /// Validity test for path candidates.
    pub strictness: CoverStrictness,

    /// Torso offset above the cover cell floor.
    pub torso_offset: f32,
}

impl Default for TakeCoverConfig {
    fn default() -> Self {
        Self {
            start_min_sq:        25.0,
            abort_sq:            9.0,
            arrival_sq:          1.0,
            cast_distance:       10.0,
            initial_path_offset: 20.0,
            candidate_buffer:    4,
            strictness:          CoverStrictness::Peeking,
            torso_offset:        0.5,
        }
    }
}

// ── CoverConfig ───────────────────────────────────────────────────────────────

/// Top-level engine configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the scheduler.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoverConfig {
    /// Simulated milliseconds per tick.
    pub tick_duration_ms: u32,

    /// How long an unheld cover entry survives in the table, in simulated
    /// seconds.  Also the interval between purge sweeps.
    pub cover_ttl_secs: f32,

    pub move_to_cover: MoveToCoverConfig,

    pub take_cover: TakeCoverConfig,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: 50,
            cover_ttl_secs:   60.0,
            move_to_cover:    MoveToCoverConfig::default(),
            take_cover:       TakeCoverConfig::default(),
        }
    }
}

impl CoverConfig {
    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_ms)
    }

    /// Cover TTL converted to ticks.
    pub fn cover_ttl_ticks(&self) -> u64 {
        self.make_clock().ticks_for_secs(self.cover_ttl_secs)
    }

    /// Check every field for values the engine cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_ms == 0 {
            return Err(CoreError::Config("tick_duration_ms must be > 0".into()));
        }
        if self.cover_ttl_secs.is_nan() || self.cover_ttl_secs <= 0.0 {
            return Err(CoreError::Config("cover_ttl_secs must be > 0".into()));
        }
        self.move_to_cover.self_distance.validate()?;
        self.move_to_cover.target_distance.validate()?;
        if self.take_cover.candidate_buffer == 0 {
            return Err(CoreError::Config("take_cover.candidate_buffer must be >= 1".into()));
        }
        if self.take_cover.abort_sq > self.take_cover.start_min_sq {
            return Err(CoreError::Config(format!(
                "take_cover.abort_sq ({}) exceeds start_min_sq ({})",
                self.take_cover.abort_sq, self.take_cover.start_min_sq
            )));
        }
        Ok(())
    }
}
