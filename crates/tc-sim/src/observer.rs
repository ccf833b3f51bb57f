//! Simulation observer trait for progress reporting and data collection.

use tc_core::{AgentId, Tick};
use tc_task::TaskStatus;

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: outcome logger
///
/// ```rust,ignore
/// struct Outcomes(Vec<(AgentId, TaskStatus)>);
///
/// impl SimObserver for Outcomes {
///     fn on_task_finished(&mut self, _tick: Tick, agent: AgentId, _task: &str, status: TaskStatus) {
///         self.0.push((agent, status));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called when the purge sweep ran this tick.  `removed` is the number
    /// of expired entries dropped.
    fn on_purge(&mut self, _tick: Tick, _removed: usize) {}

    /// Called when an agent's task reached `Done` or `Failed`, after its
    /// `stop` ran.
    fn on_task_finished(&mut self, _tick: Tick, _agent: AgentId, _task: &str, _status: TaskStatus) {}

    /// Called at the end of each tick.  `active` is the number of agents
    /// whose task is still running.
    fn on_tick_end(&mut self, _tick: Tick, _active: usize) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
