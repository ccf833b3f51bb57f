//! Reference asynchronous pathfinder over a [`VoxelGrid`].
//!
//! Requests are queued and resolved by [`Pathfinder::poll`] once their
//! latency has elapsed, so tasks observe the same "still calculating" window
//! a game's navigation service would give them.
//!
//! # Search
//!
//! A* over walkable cells, 4-neighbour, stepping up or down at most one
//! cell per move.  Every move costs [`STEP_COST`]; the heuristic is the
//! larger of the horizontal Manhattan distance and the vertical distance,
//! which never overestimates with that move set.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use tc_core::{AgentId, GridPos, Tick, Vec3};

use crate::{PathResult, Pathfinder, VoxelGrid};

/// Cost of a single move between neighbouring cells.
const STEP_COST: u32 = 10;

/// Default cap on expanded nodes per request.
pub const DEFAULT_MAX_EXPANSIONS: usize = 16_384;

const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(Debug, Clone)]
struct PendingRequest {
    from:     Vec3,
    to:       Vec3,
    speed:    f32,
    ready_at: Tick,
}

// ── GridPathfinder ────────────────────────────────────────────────────────────

/// Grid A* resolved after a fixed latency.
///
/// `can_break_blocks` is accepted for interface parity; this pathfinder never
/// plans through solid cells.
pub struct GridPathfinder {
    grid:           Arc<VoxelGrid>,
    latency_ticks:  u64,
    max_expansions: usize,
    /// Last tick seen by `poll`; requests are timed from here.
    now:            Tick,
    pending:        FxHashMap<AgentId, PendingRequest>,
    paths:          FxHashMap<AgentId, PathResult>,
}

impl GridPathfinder {
    /// Requests become visible on the first poll at least `latency_ticks`
    /// (minimum 1) ticks after submission.
    pub fn new(grid: Arc<VoxelGrid>, latency_ticks: u64) -> Self {
        Self {
            grid,
            latency_ticks:  latency_ticks.max(1),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            now:            Tick::ZERO,
            pending:        FxHashMap::default(),
            paths:          FxHashMap::default(),
        }
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions.max(1);
        self
    }

    #[inline]
    pub fn grid(&self) -> &Arc<VoxelGrid> {
        &self.grid
    }

    #[inline]
    pub fn latency_ticks(&self) -> u64 {
        self.latency_ticks
    }

    /// Number of requests still waiting for their latency to elapse.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Synchronous search used by `poll`.  Returns cell-centered waypoints
    /// from the first cell after the start to the goal; a start already in
    /// the goal cell yields the goal alone.
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        let start = self.grid.supporting_cell(from)?;
        let goal = self.grid.supporting_cell(to)?;
        if !self.grid.is_walkable(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![goal.center_xz()]);
        }
        let cells = astar(&self.grid, start, goal, self.max_expansions)?;
        Some(cells.into_iter().skip(1).map(GridPos::center_xz).collect())
    }
}

impl Pathfinder for GridPathfinder {
    fn request_path(
        &mut self,
        agent:             AgentId,
        from:              Vec3,
        to:                Vec3,
        speed:             f32,
        _can_break_blocks: bool,
    ) {
        self.paths.remove(&agent);
        let ready_at = self.now + self.latency_ticks;
        trace!(%agent, %from, %to, %ready_at, "path requested");
        self.pending.insert(agent, PendingRequest { from, to, speed, ready_at });
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

    fn poll(&mut self, now: Tick) {
        self.now = now;

        let mut ready: Vec<AgentId> = self
            .pending
            .iter()
            .filter(|(_, req)| req.ready_at <= now)
            .map(|(&agent, _)| agent)
            .collect();
        ready.sort_unstable();

        for agent in ready {
            let Some(req) = self.pending.remove(&agent) else { continue };
            match self.find_path(req.from, req.to) {
                Some(waypoints) => {
                    debug!(%agent, tick = %now, waypoints = waypoints.len(), "path resolved");
                    self.paths.insert(agent, PathResult::new(waypoints, req.speed));
                }
                None => {
                    debug!(%agent, tick = %now, from = %req.from, to = %req.to, "no path");
                }
            }
        }
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

#[inline]
fn heuristic(a: GridPos, b: GridPos) -> u32 {
    let flat = (a.x - b.x).unsigned_abs() + (a.z - b.z).unsigned_abs();
    flat.max((a.y - b.y).unsigned_abs()) * STEP_COST
}

fn astar(grid: &VoxelGrid, start: GridPos, goal: GridPos, max_expansions: usize) -> Option<Vec<GridPos>> {
    let mut best: FxHashMap<GridPos, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<GridPos, GridPos> = FxHashMap::default();

    // Min-heap on (f, g, cell); the cell breaks ties deterministically.
    let mut heap: BinaryHeap<Reverse<(u32, u32, GridPos)>> = BinaryHeap::new();
    best.insert(start, 0);
    heap.push(Reverse((heuristic(start, goal), 0, start)));

    let mut expanded = 0usize;
    while let Some(Reverse((_, cost, cell))) = heap.pop() {
        if cell == goal {
            return Some(reconstruct(&came_from, goal));
        }
        if best.get(&cell).is_some_and(|&g| cost > g) {
            continue;
        }
        expanded += 1;
        if expanded > max_expansions {
            trace!(%start, %goal, expanded, "expansion limit reached");
            return None;
        }

        for (dx, dz) in NEIGHBOURS {
            for dy in [0, 1, -1] {
                let next = cell.offset(dx, dy, dz);
                if !grid.is_walkable(next) {
                    continue;
                }
                // Stepping up needs headroom above the current cell too.
                if dy == 1 && grid.blocks_movement(cell.above().above()) {
                    continue;
                }
                let new_cost = cost + STEP_COST;
                if best.get(&next).is_none_or(|&g| new_cost < g) {
                    best.insert(next, new_cost);
                    came_from.insert(next, cell);
                    heap.push(Reverse((new_cost + heuristic(next, goal), new_cost, next)));
                }
                break;
            }
        }
    }
    None
}

fn reconstruct(came_from: &FxHashMap<GridPos, GridPos>, goal: GridPos) -> Vec<GridPos> {
    let mut cells = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came_from.get(&cur) {
        cells.push(prev);
        cur = prev;
    }
    cells.reverse();
    cells
}
