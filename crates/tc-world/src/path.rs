//! Asynchronous pathfinding interface.
//!
//! Path requests are fire-and-forget: a task submits one and polls
//! [`Pathfinder::is_calculating_path`] on later ticks.  When computation
//! ends the agent either has a [`PathResult`] (success) or nothing and is
//! no longer calculating (failure).  This polling is the only suspension
//! point of the cover engine; nothing ever blocks the scheduler on it.

use tc_core::{AgentId, Tick, Vec3};

/// A computed path and the agent's progress along it.
///
/// `finished` is set by locomotion once the agent has stepped onto the last
/// waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Waypoints to visit in order, from (or next to) the start to the
    /// destination.
    pub waypoints: Vec<Vec3>,
    /// Index of the next waypoint to move towards.
    pub cursor: usize,
    /// Movement speed requested for this path, in cells per second.
    pub speed: f32,
    /// `true` once the agent reached the final waypoint.
    pub finished: bool,
}

impl PathResult {
    pub fn new(waypoints: Vec<Vec3>, speed: f32) -> Self {
        let finished = waypoints.is_empty();
        Self { waypoints, cursor: 0, speed, finished }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The waypoint the agent is currently heading for.
    #[inline]
    pub fn next_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.cursor).copied()
    }

    /// Final waypoint, if the path has any.
    #[inline]
    pub fn destination(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }

    /// Move the cursor past the current waypoint, finishing the path when
    /// the last one is consumed.
    pub fn advance(&mut self) {
        if self.cursor < self.waypoints.len() {
            self.cursor += 1;
        }
        if self.cursor >= self.waypoints.len() {
            self.finished = true;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Pluggable asynchronous pathfinding service and per-agent navigator.
///
/// Implement this trait to drive the engine from a game's navigation
/// system.  The bundled implementation is
/// [`GridPathfinder`][crate::GridPathfinder].
pub trait Pathfinder {
    /// Submit a path request for `agent`, replacing any earlier request or
    /// path the agent had.
    fn request_path(
        &mut self,
        agent:            AgentId,
        from:             Vec3,
        to:               Vec3,
        speed:            f32,
        can_break_blocks: bool,
    );

    /// `true` while a request for `agent` is still being computed.
    fn is_calculating_path(&self, agent: AgentId) -> bool;

    /// The agent's current path, if one was computed and not cleared.
    fn path(&self, agent: AgentId) -> Option<&PathResult>;

    /// Mutable access for the locomotion step that walks the path.
    fn path_mut(&mut self, agent: AgentId) -> Option<&mut PathResult>;

    /// Drop every pending request and the current path of `agent`.
    fn cancel_paths(&mut self, agent: AgentId);

    /// Give the service a chance to complete requests.  Called once per tick
    /// by the scheduler before any task runs.
    fn poll(&mut self, _now: Tick) {}

    /// No path and none being computed.
    fn no_path_and_not_planning(&self, agent: AgentId) -> bool {
        !self.is_calculating_path(agent) && self.path(agent).is_none()
    }
}
