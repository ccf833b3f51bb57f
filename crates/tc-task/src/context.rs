//! The state a task sees and mutates during one tick.

use tc_core::{AgentId, BodyOffsets, CoverConfig, Tick, Vec3};
use tc_table::CoverTable;
use tc_world::{CollisionMask, LineOfSight, Pathfinder};
use tc_search::CoverOracle;

// ── AgentState ────────────────────────────────────────────────────────────────

/// The agent accessors the cover engine relies on.
///
/// `position` is at the feet; body points are derived from the height
/// fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id:         AgentId,
    pub position:   Vec3,
    pub hip_height: f32,
    pub eye_height: f32,
    /// Cells per second.
    pub move_speed: f32,
    pub stunned:    bool,
    pub sleeping:   bool,
    pub jumping:    bool,
    pub swimming:   bool,
    pub crouching:  bool,
    /// Point the agent is turned towards, if any.
    pub look_at:    Option<Vec3>,
}

impl AgentState {
    pub fn new(id: AgentId, position: Vec3) -> Self {
        Self {
            id,
            position,
            hip_height: 0.9,
            eye_height: 1.6,
            move_speed: 4.0,
            stunned:    false,
            sleeping:   false,
            jumping:    false,
            swimming:   false,
            crouching:  false,
            look_at:    None,
        }
    }

    #[inline]
    pub fn hip(&self) -> Vec3 {
        self.position.up(self.hip_height)
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.position.up(self.eye_height)
    }

    /// Stunned, asleep, or airborne out of water.
    pub fn is_impaired(&self) -> bool {
        self.stunned || self.sleeping || (self.jumping && !self.swimming)
    }
}

// ── Threat ────────────────────────────────────────────────────────────────────

/// What the agent hides from.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Threat {
    /// Feet position.
    pub position:     Vec3,
    pub hip_height:   f32,
    pub chest_height: f32,
    pub eye_height:   f32,
}

impl Threat {
    pub fn new(position: Vec3) -> Self {
        Self { position, hip_height: 0.9, chest_height: 1.2, eye_height: 1.6 }
    }

    /// Eye level: cover must block line of *sight* from here.
    #[inline]
    pub fn head(&self) -> Vec3 {
        self.position.up(self.eye_height)
    }

    #[inline]
    pub fn hip(&self) -> Vec3 {
        self.position.up(self.hip_height)
    }

    #[inline]
    pub fn chest(&self) -> Vec3 {
        self.position.up(self.chest_height)
    }
}

// ── TaskContext ───────────────────────────────────────────────────────────────

/// Everything one task update may read or mutate.
///
/// Built by the scheduler for a single agent and dropped before the next
/// agent runs, so at most one task touches the table at a time.
pub struct TaskContext<'a, L, P> {
    pub now:        Tick,
    pub agent:      &'a mut AgentState,
    pub threat:     Option<Threat>,
    pub table:      &'a mut CoverTable,
    pub los:        &'a L,
    pub pathfinder: &'a mut P,
    pub config:     &'a CoverConfig,
}

impl<'a, L: LineOfSight, P: Pathfinder> TaskContext<'a, L, P> {
    #[inline]
    pub fn agent_id(&self) -> AgentId {
        self.agent.id
    }

    /// Oracle over this context's line of sight, using the agent's eye
    /// height and the given torso offset.
    pub fn oracle(&self, torso_offset: f32) -> CoverOracle<&'a L> {
        CoverOracle::new(
            self.los,
            CollisionMask::PROJECTILES,
            BodyOffsets::new(torso_offset, self.agent.eye_height),
        )
    }

    /// Cancel navigation and turn to face the threat.
    pub fn stop_moving(&mut self) {
        self.pathfinder.cancel_paths(self.agent.id);
        if let Some(threat) = self.threat {
            self.agent.look_at = Some(threat.head());
        }
    }

    /// The agent's current path is complete.
    pub fn path_finished(&self) -> bool {
        self.pathfinder.path(self.agent.id).is_some_and(|p| p.is_finished())
    }
}
