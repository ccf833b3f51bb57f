//! The `Sim` struct and its tick loop.

use tracing::{debug, info, trace};

use tc_core::{AgentId, CoverConfig, SimClock, Tick};
use tc_table::CoverTable;
use tc_task::{AgentState, CoverTask, Task, TaskContext, TaskStatus, Threat};
use tc_world::{LineOfSight, Pathfinder};

use crate::{SimError, SimObserver, SimResult, locomotion};

// ── Per-agent task slot ───────────────────────────────────────────────────────

/// A task assigned to an agent and whether its `start` has run.
struct ActiveTask {
    task:    Task,
    started: bool,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The cover engine scheduler.
///
/// `Sim<W, P>` owns the cover table, the agents, and their tasks, and drives
/// the four-phase tick loop:
///
/// 1. **Paths**: give the pathfinder a chance to resolve requests.
/// 2. **Purge**: expire stale cover entries (gated by the TTL interval).
/// 3. **Tasks** (ascending `AgentId`): `start` on the first tick, then
///    `update`; a terminal status runs `stop` and clears the slot.
/// 4. **Locomotion**: step every agent along its current path.
///
/// Tasks run one at a time, so table mutations are serialized.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: LineOfSight, P: Pathfinder> {
    /// Engine configuration (tick length, cover TTL, task tuning).
    pub config: CoverConfig,

    /// Simulation clock: tracks the current tick and maps to seconds.
    pub clock: SimClock,

    /// Line-of-sight provider.
    pub world: W,

    pub pathfinder: P,

    /// Cover reservations shared by every agent.
    pub table: CoverTable,

    /// Indexed by `AgentId`.
    pub agents: Vec<AgentState>,

    /// What each agent hides from, indexed by `AgentId`.
    pub threats: Vec<Option<Threat>>,

    tasks:    Vec<Option<ActiveTask>>,
    outcomes: Vec<Option<TaskStatus>>,
}

impl<W: LineOfSight, P: Pathfinder> Sim<W, P> {
    pub(crate) fn new(
        config:     CoverConfig,
        world:      W,
        pathfinder: P,
        agents:     Vec<AgentState>,
        threats:    Vec<Option<Threat>>,
    ) -> Self {
        let clock = config.make_clock();
        let n = agents.len();
        Self {
            table: CoverTable::new(clock.current_tick),
            clock,
            config,
            world,
            pathfinder,
            agents,
            threats,
            tasks:    (0..n).map(|_| None).collect(),
            outcomes: vec![None; n],
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn agent(&self, agent: AgentId) -> SimResult<&AgentState> {
        self.agents.get(agent.index()).ok_or(SimError::UnknownAgent(agent))
    }

    pub fn agent_mut(&mut self, agent: AgentId) -> SimResult<&mut AgentState> {
        self.agents.get_mut(agent.index()).ok_or(SimError::UnknownAgent(agent))
    }

    /// Set or clear the threat `agent` hides from.
    pub fn set_threat(&mut self, agent: AgentId, threat: Option<Threat>) -> SimResult<()> {
        let slot = self.threats.get_mut(agent.index()).ok_or(SimError::UnknownAgent(agent))?;
        *slot = threat;
        Ok(())
    }

    /// Give `agent` a new task.  A task it is still running is stopped
    /// first.  The new task starts on the next tick.
    pub fn assign_task(&mut self, agent: AgentId, task: impl Into<Task>) -> SimResult<()> {
        self.cancel_task(agent)?;
        let task = task.into();
        debug!(%agent, task = task.name(), tick = %self.now(), "task assigned");
        self.tasks[agent.index()] = Some(ActiveTask { task, started: false });
        self.outcomes[agent.index()] = None;
        Ok(())
    }

    /// Stop and drop the agent's running task, releasing any reservation it
    /// has not occupied yet.  Returns `true` if a task was running.
    pub fn cancel_task(&mut self, agent: AgentId) -> SimResult<bool> {
        let i = agent.index();
        if i >= self.agents.len() {
            return Err(SimError::UnknownAgent(agent));
        }
        let Some(mut active) = self.tasks[i].take() else {
            return Ok(false);
        };
        if active.started {
            let now = self.clock.current_tick;
            let mut ctx = TaskContext {
                now,
                agent:      &mut self.agents[i],
                threat:     self.threats[i],
                table:      &mut self.table,
                los:        &self.world,
                pathfinder: &mut self.pathfinder,
                config:     &self.config,
            };
            active.task.stop(&mut ctx);
        } else {
            self.pathfinder.cancel_paths(agent);
        }
        debug!(%agent, task = active.task.name(), "task cancelled");
        Ok(true)
    }

    /// `agent` has a task that has not finished yet.
    pub fn is_busy(&self, agent: AgentId) -> bool {
        self.tasks.get(agent.index()).is_some_and(Option::is_some)
    }

    /// How the agent's last task ended, or `None` while one is running or
    /// none ever ran.
    pub fn outcome(&self, agent: AgentId) -> Option<TaskStatus> {
        self.outcomes.get(agent.index()).copied().flatten()
    }

    /// Number of agents with a running task.
    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_some()).count()
    }

    /// Run exactly `n` ticks from the current position.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Run until no agent has a task or `max_ticks` elapse.  Returns the
    /// number of ticks run.
    pub fn run_until_idle<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && self.active_tasks() > 0 {
            self.step(observer);
            ran += 1;
        }
        info!(ticks = ran, tick = %self.now(), idle = self.active_tasks() == 0, "run finished");
        ran
    }

    /// Process the current tick and advance the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.process_tick(now, observer);
        observer.on_tick_end(now, self.active_tasks());
        self.clock.advance();
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        // ── Phase 1: resolve path requests ────────────────────────────────
        self.pathfinder.poll(now);

        // ── Phase 2: cover purge ──────────────────────────────────────────
        if let Some(removed) = self.table.purge_expired(now, self.config.cover_ttl_ticks()) {
            observer.on_purge(now, removed);
        }

        // ── Phase 3: tasks, ascending AgentId ─────────────────────────────
        for i in 0..self.agents.len() {
            let Some(active) = self.tasks[i].as_mut() else { continue };
            let mut ctx = TaskContext {
                now,
                agent:      &mut self.agents[i],
                threat:     self.threats[i],
                table:      &mut self.table,
                los:        &self.world,
                pathfinder: &mut self.pathfinder,
                config:     &self.config,
            };

            let status = if active.started {
                active.task.update(&mut ctx)
            } else {
                active.started = true;
                match active.task.start(&mut ctx) {
                    TaskStatus::Continue => active.task.update(&mut ctx),
                    terminal => terminal,
                }
            };

            if status.is_terminal() {
                active.task.stop(&mut ctx);
                let agent = ctx.agent.id;
                let name = active.task.name();
                debug!(%agent, task = name, %status, tick = %now, "task finished");
                observer.on_task_finished(now, agent, name, status);
                self.tasks[i] = None;
                self.outcomes[i] = Some(status);
            }
        }

        // ── Phase 4: locomotion ───────────────────────────────────────────
        let dt = self.clock.tick_secs();
        for agent in &mut self.agents {
            if agent.is_impaired() {
                continue;
            }
            if let Some(path) = self.pathfinder.path_mut(agent.id) {
                if !path.is_finished() {
                    let walked = locomotion::step(agent, path, dt);
                    trace!(agent = %agent.id, position = %agent.position, walked, "moved");
                }
            }
        }
    }
}
