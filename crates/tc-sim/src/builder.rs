//! Fluent builder for constructing a [`Sim`].

use tc_core::{AgentId, CoverConfig, Vec3};
use tc_task::{AgentState, Threat};
use tc_world::{LineOfSight, Pathfinder};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<W, P>`].
///
/// # Required inputs
///
/// - [`CoverConfig`]: tick length, cover TTL, task tuning
/// - `W: LineOfSight`: the world cover is tested against (e.g. a
///   [`tc_world::VoxelGrid`])
/// - `P: Pathfinder`: the navigation service (e.g. a
///   [`tc_world::GridPathfinder`])
///
/// # Optional inputs
///
/// | Method               | Default                |
/// |----------------------|------------------------|
/// | `.agent(state)`      | no agents              |
/// | `.spawn(position)`   | no agents              |
/// | `.threat(id, t)`     | no threat for anyone   |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, grid, GridPathfinder::new(grid.clone(), 2))
///     .spawn(Vec3::new(0.5, 0.0, 0.5))
///     .threat(AgentId(0), Threat::new(Vec3::new(10.5, 0.0, 0.5)))
///     .build()?;
/// sim.assign_task(AgentId(0), MoveToCover::default())?;
/// sim.run_until_idle(200, &mut NoopObserver);
/// ```
pub struct SimBuilder<W: LineOfSight, P: Pathfinder> {
    config:     CoverConfig,
    world:      W,
    pathfinder: P,
    agents:     Vec<AgentState>,
    threats:    Vec<(AgentId, Threat)>,
}

impl<W: LineOfSight, P: Pathfinder> SimBuilder<W, P> {
    pub fn new(config: CoverConfig, world: W, pathfinder: P) -> Self {
        Self {
            config,
            world,
            pathfinder,
            agents:  Vec::new(),
            threats: Vec::new(),
        }
    }

    /// Add a fully specified agent.  Its id must equal the number of agents
    /// added before it.
    pub fn agent(mut self, agent: AgentState) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add an agent with default body metrics at `position`, taking the
    /// next free id.
    pub fn spawn(mut self, position: Vec3) -> Self {
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(AgentState::new(id, position));
        self
    }

    pub fn threat(mut self, agent: AgentId, threat: Threat) -> Self {
        self.threats.push((agent, threat));
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W, P>> {
        self.config.validate()?;

        for (index, agent) in self.agents.iter().enumerate() {
            if agent.id.index() != index {
                return Err(SimError::AgentIdMismatch { index, got: agent.id });
            }
        }

        let mut threats = vec![None; self.agents.len()];
        for (agent, threat) in self.threats {
            let slot = threats.get_mut(agent.index()).ok_or(SimError::UnknownAgent(agent))?;
            *slot = Some(threat);
        }

        Ok(Sim::new(self.config, self.world, self.pathfinder, self.agents, threats))
    }
}
