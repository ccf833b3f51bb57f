//! Unit tests for tc-task.
//!
//! Tasks run against `Rig`, which owns everything a `TaskContext` borrows,
//! and `ScriptedPathfinder`, whose requests only resolve when a test says
//! so.  Move-to-cover tests use the `CellBlocker` line-of-sight stub;
//! take-cover tests use a real `VoxelGrid`.

#[cfg(test)]
mod helpers {
    use std::cell::Cell;
    use std::collections::HashMap;

    use tc_core::{AgentId, CoverConfig, GridPos, Tick, Vec3};
    use tc_table::CoverTable;
    use tc_world::{CollisionMask, LineOfSight, PathResult, Pathfinder, RayHit};

    use crate::{AgentState, TaskContext, Threat};

    // ── Line of sight ─────────────────────────────────────────────────────

    /// Blocks any segment ending inside one of its cells.
    pub struct CellBlocker {
        cells: Vec<GridPos>,
        calls: Cell<usize>,
    }

    impl CellBlocker {
        pub fn new(cells: &[(i32, i32, i32)]) -> Self {
            Self {
                cells: cells.iter().map(|&(x, y, z)| GridPos::new(x, y, z)).collect(),
                calls: Cell::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl LineOfSight for CellBlocker {
        fn raycast(&self, from: Vec3, to: Vec3, _mask: CollisionMask) -> Option<RayHit> {
            self.calls.set(self.calls.get() + 1);
            self.cells.contains(&GridPos::from_world(to)).then(|| RayHit {
                point:    to,
                normal:   Vec3::ZERO,
                distance: from.distance(to),
            })
        }
    }

    // ── Pathfinder ────────────────────────────────────────────────────────

    #[derive(Default)]
    pub struct ScriptedPathfinder {
        /// Every request in submission order: (agent, destination).
        pub requests: Vec<(AgentId, Vec3)>,
        pending:      HashMap<AgentId, Vec3>,
        paths:        HashMap<AgentId, PathResult>,
    }

    impl ScriptedPathfinder {
        /// Complete the agent's pending request with `waypoints`.
        pub fn resolve(&mut self, agent: AgentId, waypoints: Vec<Vec3>) {
            assert!(self.pending.remove(&agent).is_some(), "no pending request for {agent}");
            self.paths.insert(agent, PathResult::new(waypoints, 4.0));
        }

        /// Complete the pending request with a single waypoint at its goal.
        pub fn resolve_direct(&mut self, agent: AgentId) {
            let goal = self.pending[&agent];
            self.resolve(agent, vec![goal]);
        }

        /// Drop the pending request as unroutable.
        pub fn fail(&mut self, agent: AgentId) {
            assert!(self.pending.remove(&agent).is_some(), "no pending request for {agent}");
        }

        /// Mark the agent's path as walked to the end.
        pub fn finish(&mut self, agent: AgentId) {
            if let Some(path) = self.paths.get_mut(&agent) {
                path.finished = true;
            }
        }

        pub fn last_goal(&self) -> Option<Vec3> {
            self.requests.last().map(|&(_, goal)| goal)
        }
    }

    impl Pathfinder for ScriptedPathfinder {
        fn request_path(&mut self, agent: AgentId, _from: Vec3, to: Vec3, _speed: f32, _break: bool) {
            self.paths.remove(&agent);
            self.pending.insert(agent, to);
            self.requests.push((agent, to));
        }

        fn is_calculating_path(&self, agent: AgentId) -> bool {
            self.pending.contains_key(&agent)
        }

        fn path(&self, agent: AgentId) -> Option<&PathResult> {
            self.paths.get(&agent)
        }

        fn path_mut(&mut self, agent: AgentId) -> Option<&mut PathResult> {
            self.paths.get_mut(&agent)
        }

        fn cancel_paths(&mut self, agent: AgentId) {
            self.pending.remove(&agent);
            self.paths.remove(&agent);
        }
    }

    // ── Rig ───────────────────────────────────────────────────────────────

    pub const AGENT: AgentId = AgentId(1);

    pub const NO_PARAMS: [(&str, &str); 0] = [];

    pub struct Rig<L> {
        pub los:        L,
        pub pathfinder: ScriptedPathfinder,
        pub table:      CoverTable,
        pub agent:      AgentState,
        pub threat:     Option<Threat>,
        pub config:     CoverConfig,
        pub now:        Tick,
    }

    impl<L: LineOfSight> Rig<L> {
        pub fn new(los: L, agent_at: Vec3, threat_at: Vec3) -> Self {
            Self {
                los,
                pathfinder: ScriptedPathfinder::default(),
                table:      CoverTable::default(),
                agent:      AgentState::new(AGENT, agent_at),
                threat:     Some(Threat::new(threat_at)),
                config:     CoverConfig::default(),
                now:        Tick::ZERO,
            }
        }

        pub fn ctx(&mut self) -> TaskContext<'_, L, ScriptedPathfinder> {
            TaskContext {
                now:        self.now,
                agent:      &mut self.agent,
                threat:     self.threat,
                table:      &mut self.table,
                los:        &self.los,
                pathfinder: &mut self.pathfinder,
                config:     &self.config,
            }
        }

        /// Position of whatever the agent holds.
        pub fn held(&self) -> Option<Vec3> {
            self.table.cover_for(AGENT).map(|c| c.position)
        }
    }

    /// Agent at the origin cell, threat ten cells east, one blocking cell
    /// three cells east of the agent.
    pub fn skirmish() -> Rig<CellBlocker> {
        Rig::new(
            CellBlocker::new(&[(3, 0, 0)]),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(10.5, 0.0, 0.5),
        )
    }

    pub fn cover_spot() -> Vec3 {
        Vec3::new(3.5, 0.0, 0.5)
    }
}

// ── Move to cover ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod move_to_cover {
    use tc_core::{DistanceRange, MoveToCoverConfig, Octant, Tick, Vec3};
    use tc_world::Pathfinder;

    use super::helpers::{AGENT, CellBlocker, Rig, cover_spot, skirmish};
    use crate::{CoverTask, FailReason, MoveToCover, TaskStatus};

    #[test]
    fn reserves_paths_and_occupies() {
        let mut rig = skirmish();
        let mut task = MoveToCover::default();

        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);

        let entry = rig.table.find(cover_spot()).expect("cover catalogued");
        assert!(entry.reserved && entry.is_held_by(AGENT));
        assert_eq!(entry.direction, Some(Octant::E));
        assert_eq!(rig.pathfinder.last_goal(), Some(cover_spot()));

        // Waiting on the pathfinder, then walking.
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        rig.pathfinder.resolve_direct(AGENT);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(rig.pathfinder.requests.len(), 1);

        rig.agent.position = cover_spot();
        rig.pathfinder.finish(AGENT);
        rig.now = Tick(5);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Done);

        assert!(rig.table.has_cover(AGENT));
        assert_eq!(rig.table.find(cover_spot()).map(|c| c.last_touched), Some(Tick(5)));
        assert!(rig.pathfinder.no_path_and_not_planning(AGENT));
        assert_eq!(rig.agent.look_at, Some(Vec3::new(10.5, 1.6, 0.5)));

        // Still sheltered: stays done without searching again.
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Done);
        assert_eq!(rig.pathfinder.requests.len(), 1);
    }

    #[test]
    fn disjoint_ranges_fail_before_any_raycast() {
        let mut rig = Rig::new(CellBlocker::new(&[]), Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        let mut task = MoveToCover::default()
            .with_ranges(DistanceRange::new(0.0, 10.0), DistanceRange::new(0.0, 10.0));

        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::RangesDoNotOverlap));
        assert_eq!(rig.los.calls(), 0);
        assert!(rig.table.is_empty());
        assert!(rig.pathfinder.requests.is_empty());
    }

    #[test]
    fn too_close_to_target() {
        let mut rig = Rig::new(CellBlocker::new(&[]), Vec3::new(0.5, 0.0, 0.5), Vec3::new(2.5, 0.0, 0.5));
        let mut task = MoveToCover::default()
            .with_ranges(DistanceRange::new(1.0, 40.0), DistanceRange::new(5.0, 34.0));
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::TooCloseToTarget));
        assert_eq!(rig.los.calls(), 0);
    }

    #[test]
    fn nothing_to_hide_behind() {
        let mut rig = Rig::new(CellBlocker::new(&[]), Vec3::new(0.5, 0.0, 0.5), Vec3::new(10.5, 0.0, 0.5));
        let mut task = MoveToCover::default();
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::SearchExhausted));
        assert!(rig.table.is_empty());
    }

    #[test]
    fn unreachable_cover_is_removed() {
        let mut rig = skirmish();
        let mut task = MoveToCover::default();
        task.update(&mut rig.ctx());
        assert_eq!(rig.held(), Some(cover_spot()));

        rig.pathfinder.fail(AGENT);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::Unreachable));
        assert!(rig.table.find(cover_spot()).is_none());
        assert_eq!(rig.table.holder_count(), 0);
        task.stop(&mut rig.ctx());

        // A fresh search must not walk straight back into the same slot.
        let mut retry = MoveToCover::default();
        assert_eq!(retry.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(retry.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::SearchExhausted));
        assert_eq!(rig.held(), None);
        assert_eq!(rig.pathfinder.requests.len(), 1);
        assert!(rig.table.is_unreachable(cover_spot()));
    }

    #[test]
    fn impaired_agents_do_not_start() {
        let mut rig = skirmish();
        rig.agent.stunned = true;
        assert_eq!(MoveToCover::default().start(&mut rig.ctx()), TaskStatus::Failed(FailReason::Impaired));

        rig.agent.stunned = false;
        rig.agent.jumping = true;
        assert_eq!(MoveToCover::default().start(&mut rig.ctx()), TaskStatus::Failed(FailReason::Impaired));

        rig.agent.swimming = true;
        assert_eq!(MoveToCover::default().start(&mut rig.ctx()), TaskStatus::Continue);
    }

    #[test]
    fn no_threat() {
        let mut rig = skirmish();
        rig.threat = None;
        let mut task = MoveToCover::default();
        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Failed(FailReason::NoTarget));
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::NoTarget));
    }

    #[test]
    fn drifting_away_releases_cover() {
        let mut rig = skirmish();
        assert!(rig.table.try_claim(AGENT, cover_spot(), Some(Octant::E), Tick::ZERO));
        rig.table.mark_in_use(AGENT, Tick::ZERO);
        rig.agent.crouching = true;

        // Agent stands three cells from its cover.
        assert_eq!(MoveToCover::default().start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(rig.held(), None);
        assert!(rig.table.find(cover_spot()).is_some());
        assert!(!rig.agent.crouching);
    }

    #[test]
    fn cover_that_stopped_blocking_is_released() {
        let mut rig = skirmish();
        assert!(rig.table.try_claim(AGENT, cover_spot(), Some(Octant::E), Tick::ZERO));
        rig.table.mark_in_use(AGENT, Tick::ZERO);
        rig.agent.position = cover_spot();
        rig.los = CellBlocker::new(&[]);

        assert_eq!(MoveToCover::default().start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(rig.held(), None);
    }

    #[test]
    fn stop_releases_an_unoccupied_reservation() {
        let mut rig = skirmish();
        let mut task = MoveToCover::default();
        task.update(&mut rig.ctx());
        assert_eq!(rig.held(), Some(cover_spot()));

        task.stop(&mut rig.ctx());
        assert_eq!(rig.held(), None);
        assert!(rig.table.is_free(cover_spot()));
        assert!(rig.pathfinder.no_path_and_not_planning(AGENT));
    }

    #[test]
    fn stop_keeps_occupied_cover() {
        let mut rig = skirmish();
        assert!(rig.table.try_claim(AGENT, cover_spot(), None, Tick::ZERO));
        rig.table.mark_in_use(AGENT, Tick::ZERO);
        MoveToCover::default().stop(&mut rig.ctx());
        assert!(rig.table.has_cover(AGENT));
    }

    #[test]
    fn params_override_ranges() {
        let cfg = MoveToCoverConfig::default();
        let task =
            MoveToCover::from_params(&cfg, [("self_distance", "2,12"), ("target_distance", "20"), ("x", "y")])
                .expect("valid params");
        assert_eq!(task.self_range(), DistanceRange::new(2.0, 12.0));
        assert_eq!(task.target_range(), DistanceRange::new(5.0, 20.0));

        let unbounded = MoveToCover::from_params(&cfg, [("target_distance", "-1")]).expect("valid params");
        assert_eq!(unbounded.target_range(), DistanceRange::unbounded(5.0));

        assert!(MoveToCover::from_params(&cfg, [("self_distance", "far")]).is_err());
        assert!(MoveToCover::from_params(&cfg, [("self_distance", "9,3")]).is_err());
    }
}

// ── Take cover ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod take_cover {
    use tc_core::{GridPos, Octant, Vec3};
    use tc_world::{Pathfinder, Voxel, VoxelGrid};

    use super::helpers::{AGENT, Rig};
    use crate::{CoverTask, FailReason, TakeCover, TakeCoverState, TaskStatus, Threat};

    /// One-cell-high wall across x = 8, threat beyond it at x = 12.5.
    fn low_wall() -> Rig<VoxelGrid> {
        let mut g = VoxelGrid::new();
        for z in -2..=2 {
            g.set(GridPos::new(8, 0, z), Voxel::SOLID);
        }
        Rig::new(g, Vec3::new(2.5, 0.0, 0.5), Vec3::new(12.5, 0.0, 0.5))
    }

    /// Rough path the scripted pathfinder hands back: along z = 0.5 up to
    /// the wall.
    fn rough_path() -> Vec<Vec3> {
        (3..=7).map(|x| Vec3::new(x as f32 + 0.5, 0.0, 0.5)).collect()
    }

    fn behind_wall() -> Vec3 {
        Vec3::new(7.5, 0.0, 0.5)
    }

    #[test]
    fn full_run_behind_low_wall() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();

        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.state(), TakeCoverState::FindPath);
        // The wall is the nearest geometry west of the threat: head past it.
        assert_eq!(rig.pathfinder.last_goal(), Some(Vec3::new(-7.5, 0.9, 0.5)));

        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.state(), TakeCoverState::PreProcessPath);

        rig.pathfinder.resolve(AGENT, rough_path());
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.state(), TakeCoverState::ProcessPath);
        assert_eq!(task.cover_point(), Some(behind_wall()));
        assert_eq!(rig.pathfinder.last_goal(), Some(behind_wall()));
        let entry = rig.table.find(behind_wall()).expect("cover catalogued");
        assert!(entry.reserved && entry.is_held_by(AGENT));
        assert_eq!(entry.direction, Some(Octant::E));

        rig.pathfinder.resolve_direct(AGENT);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);

        rig.agent.position = Vec3::new(7.2, 0.0, 0.5);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Done);
        assert!(rig.table.has_cover(AGENT));
        assert!(rig.pathfinder.no_path_and_not_planning(AGENT));
    }

    #[test]
    fn open_ground_heads_straight_away() {
        let mut rig = Rig::new(VoxelGrid::new(), Vec3::new(12.5, 0.0, -9.5), Vec3::new(12.5, 0.0, 0.5));
        let mut task = TakeCover::default();
        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(rig.pathfinder.last_goal(), Some(Vec3::new(12.5, 0.9, -19.5)));

        // Nothing to cast from along an empty path.
        rig.pathfinder.resolve(AGENT, vec![Vec3::new(12.5, 0.0, -10.5)]);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::SearchExhausted));
        assert!(rig.table.is_empty());
    }

    #[test]
    fn threat_too_close_to_start() {
        let mut rig = low_wall();
        rig.threat = Some(Threat::new(Vec3::new(5.5, 0.0, 0.5)));
        assert_eq!(TakeCover::default().start(&mut rig.ctx()), TaskStatus::Failed(FailReason::TooCloseToThreat));
    }

    #[test]
    fn threat_closing_in_aborts() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();
        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        rig.threat = Some(Threat::new(Vec3::new(4.5, 0.0, 0.5)));
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::TooCloseToThreat));
    }

    #[test]
    fn rough_path_failure() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();
        task.start(&mut rig.ctx());
        task.update(&mut rig.ctx());
        rig.pathfinder.fail(AGENT);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::PathFailed));
        assert_eq!(rig.pathfinder.requests.len(), 1);
    }

    #[test]
    fn unreachable_cover_is_removed() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();
        task.start(&mut rig.ctx());
        task.update(&mut rig.ctx());
        rig.pathfinder.resolve(AGENT, rough_path());
        task.update(&mut rig.ctx());
        assert_eq!(task.state(), TakeCoverState::ProcessPath);

        rig.pathfinder.fail(AGENT);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::Unreachable));
        assert!(rig.table.find(behind_wall()).is_none());
        assert_eq!(rig.table.holder_count(), 0);
        assert!(rig.table.is_unreachable(behind_wall()));
    }

    #[test]
    fn released_reservation_fails_the_walk() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();
        task.start(&mut rig.ctx());
        task.update(&mut rig.ctx());
        rig.pathfinder.resolve(AGENT, rough_path());
        task.update(&mut rig.ctx());
        assert_eq!(task.state(), TakeCoverState::ProcessPath);

        // Another caller frees the slot while the agent is on its way.
        rig.table.free(AGENT);
        rig.agent.position = Vec3::new(7.2, 0.0, 0.5);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Failed(FailReason::LostCoverPath));
        assert!(!rig.table.has_cover(AGENT));
        assert!(rig.table.find(behind_wall()).is_some_and(|c| !c.is_held()));
    }

    #[test]
    fn stop_releases_and_resets() {
        let mut rig = low_wall();
        let mut task = TakeCover::default();
        task.start(&mut rig.ctx());
        task.update(&mut rig.ctx());
        rig.pathfinder.resolve(AGENT, rough_path());
        task.update(&mut rig.ctx());
        assert!(rig.held().is_some());

        task.stop(&mut rig.ctx());
        assert_eq!(rig.held(), None);
        assert_eq!(task.state(), TakeCoverState::FindPath);
        assert_eq!(task.cover_point(), None);
        assert!(rig.pathfinder.no_path_and_not_planning(AGENT));
    }
}

// ── Task enum ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task {
    use tc_core::CoverConfig;

    use super::helpers::{AGENT, NO_PARAMS, skirmish};
    use crate::{CoverTask, Task, TaskStatus};

    #[test]
    fn built_by_name() {
        let cfg = CoverConfig::default();
        let m = Task::from_name("move_to_cover", &cfg, [("self_distance", "8")]).expect("valid");
        assert_eq!(m.map(|t| t.name()), Some("move_to_cover"));
        let t = Task::from_name("take_cover", &cfg, NO_PARAMS).expect("valid");
        assert_eq!(t.map(|t| t.name()), Some("take_cover"));
        assert_eq!(Task::from_name("hide", &cfg, NO_PARAMS).expect("valid"), None);
        assert!(Task::from_name("move_to_cover", &cfg, [("target_distance", "?")]).is_err());
    }

    #[test]
    fn dispatches_to_the_wrapped_task() {
        let mut rig = skirmish();
        let mut task = Task::from_name("move_to_cover", &rig.config.clone(), NO_PARAMS).expect("valid").expect("known");
        assert_eq!(task.start(&mut rig.ctx()), TaskStatus::Continue);
        assert_eq!(task.update(&mut rig.ctx()), TaskStatus::Continue);
        assert!(rig.held().is_some());
        task.stop(&mut rig.ctx());
        assert!(rig.table.cover_for(AGENT).is_none());
    }
}
