//! Search area and per-search distance constraints.
//!
//! # Bounds
//!
//! For each horizontal axis, with `s` the agent coordinate, `t` the target
//! coordinate, `ms` the max self distance and `mt` the max target distance:
//!
//! ```text
//! max = s + ms            clipped to min(max, t + mt)   when s > t
//! min = s - ms            clipped to max(min, t - mt)   when s < t and mt > 0
//! ```
//!
//! The rectangle keeps the search on the agent's side of the target without
//! ever clipping the side facing away from it.

use tc_core::{CoverStrictness, DistanceRange, Vec3};

// ── SearchBounds ──────────────────────────────────────────────────────────────

/// Axis-aligned XZ rectangle a search may propose cover in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl SearchBounds {
    pub fn new(origin: Vec3, target: Vec3, max_self: f32, max_target: Option<f32>) -> Self {
        let (min_x, max_x) = axis_bounds(origin.x, target.x, max_self, max_target);
        let (min_z, max_z) = axis_bounds(origin.z, target.z, max_self, max_target);
        Self { min_x, max_x, min_z, max_z }
    }

    /// Horizontal containment, edges inclusive.
    #[inline]
    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }
}

fn axis_bounds(s: f32, t: f32, max_self: f32, max_target: Option<f32>) -> (f32, f32) {
    let mut max = s + max_self;
    if let Some(mt) = max_target.filter(|_| s > t) {
        max = max.min(t + mt);
    }
    let mut min = s - max_self;
    if let Some(mt) = max_target.filter(|&mt| s < t && mt > 0.0) {
        min = min.max(t - mt);
    }
    (min, max)
}

// ── CoverQuery ────────────────────────────────────────────────────────────────

/// One cover search: where the agent is, what it hides from, and the
/// distance constraints in force.
///
/// `origin` is the agent's cell-centered position; candidates share its
/// height.  The self max is resolved at construction: an unbounded self
/// range becomes the agent→target distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoverQuery {
    pub origin:       Vec3,
    pub target:       Vec3,
    pub self_min:     f32,
    pub self_max:     f32,
    pub target_range: DistanceRange,
    pub strictness:   CoverStrictness,
}

impl CoverQuery {
    pub fn new(
        origin:       Vec3,
        target:       Vec3,
        self_range:   DistanceRange,
        target_range: DistanceRange,
        strictness:   CoverStrictness,
    ) -> Self {
        let self_max = self_range.max.unwrap_or_else(|| origin.distance(target));
        Self {
            origin,
            target,
            self_min: self_range.min,
            self_max,
            target_range,
            strictness,
        }
    }

    /// Agent → target vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.target - self.origin
    }

    #[inline]
    pub fn sqr_distance(&self) -> f32 {
        self.origin.sqr_distance(self.target)
    }

    pub fn bounds(&self) -> SearchBounds {
        SearchBounds::new(self.origin, self.target, self.self_max, self.target_range.max)
    }

    /// The self and target discs intersect.  Always true for an unbounded
    /// target range.
    pub fn ranges_overlap(&self) -> bool {
        match self.target_range.max_sq() {
            Some(max_target_sq) => {
                self.sqr_distance() - self.self_max * self.self_max - max_target_sq <= 0.0
            }
            None => true,
        }
    }

    /// The agent already stands inside a minimum distance, so cover would
    /// mean backing away.  Only applies when both minimums are positive.
    pub fn too_close(&self) -> bool {
        let sq = self.sqr_distance();
        self.self_min > 0.0
            && self.target_range.min > 0.0
            && (sq < self.self_min * self.self_min || sq < self.target_range.min_sq())
    }

    /// `candidate` lies behind the agent: on every horizontal axis where the
    /// target direction is non-zero, the candidate offset has the strictly
    /// opposite sign.
    pub fn in_opposite_quadrant(&self, candidate: Vec3) -> bool {
        let dir = self.direction();
        let offset = candidate - self.origin;
        let opposed = |d: f32, o: f32| (d > 0.0 && o < 0.0) || (d < 0.0 && o > 0.0);

        let mut any_axis = false;
        for (d, o) in [(dir.x, offset.x), (dir.z, offset.z)] {
            if d == 0.0 {
                continue;
            }
            any_axis = true;
            if !opposed(d, o) {
                return false;
            }
        }
        any_axis
    }

    /// Both squared distances fall inside their ranges.
    pub fn in_range(&self, candidate: Vec3) -> bool {
        let self_sq = self.origin.sqr_distance(candidate);
        let self_ok = self_sq >= self.self_min * self.self_min && self_sq <= self.self_max * self.self_max;
        self_ok && self.target_range.contains_sq(self.target.sqr_distance(candidate))
    }
}
