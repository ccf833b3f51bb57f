//! "Take cover": path-projected search with explicit stages.
//!
//! The agent first gets a rough path away from the threat, then casts
//! along that path for walls, reserves the best spot and re-paths to it.
//!
//! ```text
//!  FindPath ──(rough path computing)──▶ PreProcessPath ──(cover reserved)──▶ ProcessPath
//! ```
//!
//! The stage survives across ticks; `start` and `stop` reset it.

use std::fmt;

use tracing::{debug, trace};

use tc_core::{GridPos, TakeCoverConfig, Vec3};
use tc_search::{PathSearch, find_cover_along_path, nearest_blocking_direction};
use tc_world::{CollisionMask, LineOfSight, Pathfinder};

use crate::task::release_reservation;
use crate::{CoverTask, FailReason, TaskContext, TaskStatus};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TakeCoverState {
    /// Request the rough path away from the threat.
    #[default]
    FindPath,
    /// Wait for the rough path, then search along it.
    PreProcessPath,
    /// Walk to the reserved spot.
    ProcessPath,
}

impl fmt::Display for TakeCoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TakeCover {
    config:            TakeCoverConfig,
    state:             TakeCoverState,
    /// Waypoints of the rough path the cover was found along.
    tracked_path:      Vec<Vec3>,
    cover_point:       Option<Vec3>,
    initial_requested: bool,
}

impl Default for TakeCover {
    fn default() -> Self {
        Self::new(TakeCoverConfig::default())
    }
}

impl TakeCover {
    pub fn new(config: TakeCoverConfig) -> Self {
        Self {
            config,
            state:             TakeCoverState::FindPath,
            tracked_path:      Vec::new(),
            cover_point:       None,
            initial_requested: false,
        }
    }

    #[inline]
    pub fn state(&self) -> TakeCoverState {
        self.state
    }

    #[inline]
    pub fn cover_point(&self) -> Option<Vec3> {
        self.cover_point
    }

    #[inline]
    pub fn config(&self) -> &TakeCoverConfig {
        &self.config
    }

    fn reset(&mut self) {
        self.state = TakeCoverState::FindPath;
        self.tracked_path.clear();
        self.cover_point = None;
        self.initial_requested = false;
    }

    /// `None` once the rough path exists or is computing.
    fn find_path<L: LineOfSight, P: Pathfinder>(
        &mut self,
        ctx: &mut TaskContext<'_, L, P>,
    ) -> Option<TaskStatus> {
        let agent = ctx.agent_id();
        if !ctx.pathfinder.no_path_and_not_planning(agent) {
            self.state = TakeCoverState::PreProcessPath;
            return None;
        }
        if self.initial_requested {
            return Some(TaskStatus::Failed(FailReason::PathFailed));
        }
        let Some(threat) = ctx.threat else {
            return Some(TaskStatus::Failed(FailReason::NoTarget));
        };

        // Head past the nearest wall around the threat, or straight away
        // from it in the open.
        let away = nearest_blocking_direction(
            ctx.los,
            CollisionMask::PROJECTILES,
            threat.hip(),
            self.config.cast_distance,
        )
        .map(|octant| octant.unit())
        .unwrap_or_else(|| (ctx.agent.position - threat.position).normalized());

        let goal = threat.hip() + away * self.config.initial_path_offset;
        debug!(%agent, %goal, tick = %ctx.now, "requesting rough path");
        let (from, speed) = (ctx.agent.position, ctx.agent.move_speed);
        ctx.pathfinder.request_path(agent, from, goal, speed, false);
        self.initial_requested = true;
        Some(TaskStatus::Continue)
    }

    /// `None` once cover is reserved and the agent sent there.
    fn pre_process_path<L: LineOfSight, P: Pathfinder>(
        &mut self,
        ctx: &mut TaskContext<'_, L, P>,
    ) -> Option<TaskStatus> {
        let agent = ctx.agent_id();
        if ctx.pathfinder.is_calculating_path(agent) {
            return Some(TaskStatus::Continue);
        }
        let Some(path) = ctx.pathfinder.path(agent) else {
            debug!(%agent, "rough path failed");
            return Some(TaskStatus::Failed(FailReason::PathFailed));
        };
        let Some(threat) = ctx.threat else {
            return Some(TaskStatus::Failed(FailReason::NoTarget));
        };

        self.tracked_path.clear();
        self.tracked_path.extend_from_slice(&path.waypoints);

        let search = PathSearch {
            waypoints:        &self.tracked_path,
            agent_position:   ctx.agent.position,
            hip_y:            ctx.agent.hip().y,
            threat_hip:       threat.hip(),
            threat:           threat.chest(),
            cast_distance:    self.config.cast_distance,
            candidate_buffer: self.config.candidate_buffer,
            strictness:       self.config.strictness,
        };
        let oracle = ctx.oracle(self.config.torso_offset);
        let Some(cover) = find_cover_along_path(&oracle, ctx.table, &search) else {
            ctx.table.free(agent);
            return Some(TaskStatus::Failed(FailReason::SearchExhausted));
        };

        ctx.table.add_cover(cover.position, cover.direction, ctx.now);
        if !ctx.table.reserve(agent, cover.position, ctx.now) {
            return Some(TaskStatus::Failed(FailReason::SearchExhausted));
        }
        self.cover_point = Some(cover.position);

        debug!(%agent, cover = %cover.position, tick = %ctx.now, "cover reserved along path");
        let (from, speed) = (ctx.agent.position, ctx.agent.move_speed);
        ctx.pathfinder.request_path(agent, from, cover.position, speed, false);
        self.state = TakeCoverState::ProcessPath;
        None
    }

    fn process_path<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        let agent = ctx.agent_id();
        let held = self.cover_point.filter(|&cover| {
            ctx.table.cover_for(agent).is_some_and(|c| c.cell == GridPos::from_world(cover))
        });
        // The slot was released or removed behind the task's back, or the
        // tracked path was cleared outside the stage flow.
        let cover = match held {
            Some(cover) if !self.tracked_path.is_empty() => cover,
            _ => {
                debug!(%agent, cover = ?self.cover_point, "lost the reserved cover");
                ctx.table.free(agent);
                return TaskStatus::Failed(FailReason::LostCoverPath);
            }
        };

        if ctx.agent.position.sqr_distance(cover) <= self.config.arrival_sq {
            ctx.table.mark_in_use(agent, ctx.now);
            ctx.stop_moving();
            debug!(%agent, %cover, tick = %ctx.now, "in cover");
            return TaskStatus::Done;
        }

        if ctx.pathfinder.no_path_and_not_planning(agent) || ctx.path_finished() {
            debug!(%agent, %cover, "cover unreachable, removing it");
            ctx.table.free(agent);
            ctx.table.remove_unreachable(cover, ctx.now);
            return TaskStatus::Failed(FailReason::Unreachable);
        }

        TaskStatus::Continue
    }
}

impl CoverTask for TakeCover {
    fn start<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        self.reset();
        if ctx.agent.is_impaired() {
            return TaskStatus::Failed(FailReason::Impaired);
        }
        let Some(threat) = ctx.threat else {
            return TaskStatus::Failed(FailReason::NoTarget);
        };
        if ctx.agent.position.sqr_distance(threat.position) <= self.config.start_min_sq {
            debug!(agent = %ctx.agent_id(), "threat too close to start taking cover");
            return TaskStatus::Failed(FailReason::TooCloseToThreat);
        }
        TaskStatus::Continue
    }

    fn update<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        let agent = ctx.agent_id();
        let Some(threat) = ctx.threat else {
            return TaskStatus::Failed(FailReason::NoTarget);
        };
        if ctx.table.has_cover(agent) {
            return TaskStatus::Done;
        }
        if ctx.agent.position.sqr_distance(threat.position) < self.config.abort_sq {
            return TaskStatus::Failed(FailReason::TooCloseToThreat);
        }

        // Each stage either settles the tick or advances to the next one.
        loop {
            trace!(%agent, state = %self.state, tick = %ctx.now, "take cover: update");
            let settled = match self.state {
                TakeCoverState::FindPath => self.find_path(ctx),
                TakeCoverState::PreProcessPath => self.pre_process_path(ctx),
                TakeCoverState::ProcessPath => Some(self.process_path(ctx)),
            };
            if let Some(status) = settled {
                return status;
            }
        }
    }

    fn stop<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) {
        let agent = ctx.agent_id();
        release_reservation(ctx);
        debug!(%agent, state = %self.state, tick = %ctx.now, "take cover: stop");
        self.reset();
    }
}
