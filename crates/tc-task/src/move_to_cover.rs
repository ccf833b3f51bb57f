//! "Move to cover": area search around the agent.
//!
//! No stage is stored between ticks.  Each update re-evaluates, in order:
//!
//! 1. holding valid in-use cover → done;
//! 2. holding cover and the path there finished → occupy it, done;
//! 3. no path and none computing → either the held slot was unreachable
//!    (free and remove it, fail) or search, reserve and request a path;
//! 4. otherwise a path is computing or being walked → continue.

use tracing::debug;

use tc_core::{CoreResult, CoverStrictness, DistanceRange, MoveToCoverConfig, Octant, Vec3};
use tc_search::{CoverQuery, find_cover_by_spiral_search, find_existing_cover};
use tc_world::{LineOfSight, Pathfinder};

use crate::task::release_reservation;
use crate::{CoverTask, FailReason, TaskContext, TaskStatus};

/// Parameter key for the self distance range.
pub const PARAM_SELF_DISTANCE: &str = "self_distance";
/// Parameter key for the target distance range.
pub const PARAM_TARGET_DISTANCE: &str = "target_distance";

#[derive(Debug, Clone, PartialEq)]
pub struct MoveToCover {
    self_range:         DistanceRange,
    target_range:       DistanceRange,
    strictness:         CoverStrictness,
    drift_tolerance_sq: f32,
    torso_offset:       f32,
    reuse_existing:     bool,
}

impl Default for MoveToCover {
    fn default() -> Self {
        Self::new(&MoveToCoverConfig::default())
    }
}

impl MoveToCover {
    pub fn new(config: &MoveToCoverConfig) -> Self {
        Self {
            self_range:         config.self_distance,
            target_range:       config.target_distance,
            strictness:         config.strictness,
            drift_tolerance_sq: config.drift_tolerance_sq,
            torso_offset:       config.torso_offset,
            reuse_existing:     config.reuse_existing_cover,
        }
    }

    /// Build from a config plus `key=value` task parameters.
    ///
    /// Recognised keys are `self_distance` and `target_distance`, each
    /// `"min,max"` or a bare `"max"`; unknown keys are ignored.
    pub fn from_params<'p>(
        config: &MoveToCoverConfig,
        params: impl IntoIterator<Item = (&'p str, &'p str)>,
    ) -> CoreResult<Self> {
        let mut task = Self::new(config);
        for (key, value) in params {
            match key {
                PARAM_SELF_DISTANCE => {
                    task.self_range = DistanceRange::parse(value, task.self_range.min)?;
                }
                PARAM_TARGET_DISTANCE => {
                    task.target_range = DistanceRange::parse(value, task.target_range.min)?;
                }
                _ => {}
            }
        }
        Ok(task)
    }

    pub fn with_ranges(mut self, self_range: DistanceRange, target_range: DistanceRange) -> Self {
        self.self_range = self_range;
        self.target_range = target_range;
        self
    }

    pub fn with_strictness(mut self, strictness: CoverStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[inline]
    pub fn self_range(&self) -> DistanceRange {
        self.self_range
    }

    #[inline]
    pub fn target_range(&self) -> DistanceRange {
        self.target_range
    }

    /// Release held cover the agent drifted away from, or that no longer
    /// shelters it from the current threat.  Returns `true` if released.
    fn existing_cover_invalidated<L: LineOfSight, P: Pathfinder>(
        &self,
        ctx: &mut TaskContext<'_, L, P>,
    ) -> bool {
        let agent = ctx.agent_id();
        let Some(cover) = ctx.table.cover_for(agent).map(|c| c.position) else {
            return false;
        };

        if cover.sqr_distance(ctx.agent.position) > self.drift_tolerance_sq {
            debug!(%agent, %cover, "agent left its cover");
            ctx.table.free(agent);
            return true;
        }

        let sheltered = ctx.threat.is_some_and(|threat| {
            ctx.oracle(self.torso_offset).is_cover(self.strictness, cover, threat.head())
        });
        if !sheltered {
            debug!(%agent, %cover, "cover no longer blocks the threat");
            ctx.table.free(agent);
            return true;
        }
        false
    }

    /// Search for cover, reserve it, and send the agent there.
    fn find_path_to_cover<L: LineOfSight, P: Pathfinder>(
        &self,
        ctx: &mut TaskContext<'_, L, P>,
    ) -> TaskStatus {
        let agent = ctx.agent_id();
        let Some(threat) = ctx.threat else {
            return TaskStatus::Failed(FailReason::NoTarget);
        };

        let query = CoverQuery::new(
            ctx.agent.position.center_xz(),
            threat.head(),
            self.self_range,
            self.target_range,
            self.strictness,
        );

        if !query.ranges_overlap() {
            debug!(%agent, "no overlap between self and target distance ranges");
            return TaskStatus::Failed(FailReason::RangesDoNotOverlap);
        }
        if query.too_close() {
            debug!(%agent, "too close to target to seek cover");
            return TaskStatus::Failed(FailReason::TooCloseToTarget);
        }

        let oracle = ctx.oracle(self.torso_offset);
        let existing = if self.reuse_existing {
            find_existing_cover(&oracle, ctx.table, &query)
        } else {
            None
        };
        let Some(cover) = existing.or_else(|| find_cover_by_spiral_search(&oracle, ctx.table, &query))
        else {
            debug!(%agent, origin = %query.origin, "no cover position found");
            return TaskStatus::Failed(FailReason::SearchExhausted);
        };

        ctx.table.add_cover(cover, Octant::from_direction(query.direction()), ctx.now);
        if !ctx.table.reserve(agent, cover, ctx.now) {
            return TaskStatus::Failed(FailReason::SearchExhausted);
        }

        debug!(%agent, %cover, tick = %ctx.now, "cover reserved, requesting path");
        let (from, speed) = (ctx.agent.position, ctx.agent.move_speed);
        ctx.pathfinder.request_path(agent, from, cover, speed, false);
        TaskStatus::Continue
    }

    /// Occupy the reserved slot at the end of the path.
    fn finish<L: LineOfSight, P: Pathfinder>(&self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        let agent = ctx.agent_id();
        ctx.table.mark_in_use(agent, ctx.now);
        ctx.stop_moving();
        debug!(%agent, tick = %ctx.now, "in cover");
        TaskStatus::Done
    }

    /// Cover the agent is heading to or sitting in.
    fn held_cover<L, P>(ctx: &TaskContext<'_, L, P>) -> Option<Vec3> {
        ctx.table.cover_for(ctx.agent.id).map(|c| c.position)
    }
}

impl CoverTask for MoveToCover {
    fn start<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        let agent = ctx.agent_id();
        debug!(
            %agent,
            self_min = self.self_range.min,
            self_max = ?self.self_range.max,
            target_min = self.target_range.min,
            target_max = ?self.target_range.max,
            "move to cover: start"
        );

        if ctx.agent.is_impaired() {
            return TaskStatus::Failed(FailReason::Impaired);
        }
        if ctx.threat.is_none() {
            return TaskStatus::Failed(FailReason::NoTarget);
        }

        if self.existing_cover_invalidated(ctx) {
            ctx.stop_moving();
            ctx.agent.crouching = false;
        }
        TaskStatus::Continue
    }

    fn update<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        let agent = ctx.agent_id();
        if ctx.threat.is_none() {
            return TaskStatus::Failed(FailReason::NoTarget);
        }

        if ctx.table.has_cover(agent) && !self.existing_cover_invalidated(ctx) {
            return TaskStatus::Done;
        }

        if Self::held_cover(ctx).is_some() && ctx.path_finished() {
            return self.finish(ctx);
        }

        if ctx.pathfinder.no_path_and_not_planning(agent) {
            if let Some(cover) = Self::held_cover(ctx) {
                debug!(%agent, %cover, "reserved cover unreachable, removing it");
                ctx.table.free(agent);
                ctx.table.remove_unreachable(cover, ctx.now);
                return TaskStatus::Failed(FailReason::Unreachable);
            }
            return self.find_path_to_cover(ctx);
        }

        TaskStatus::Continue
    }

    fn stop<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) {
        let agent = ctx.agent_id();
        release_reservation(ctx);
        debug!(%agent, tick = %ctx.now, "move to cover: stop");
    }
}
