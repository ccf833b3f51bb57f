//! The `CoverTask` trait and the `Task` enum the scheduler stores.

use tc_core::{CoverConfig, CoreResult};
use tc_world::{LineOfSight, Pathfinder};

use crate::{MoveToCover, TakeCover, TaskContext, TaskStatus};

/// A per-agent cover controller.
///
/// The scheduler drives a task through `start`, then `update` each tick
/// until a terminal status, then `stop`.  If `start` already returns a
/// terminal status `update` is never called, but `stop` still is.
///
/// # Example
///
/// ```rust,ignore
/// let mut task = Task::MoveToCover(MoveToCover::default());
/// let mut status = task.start(&mut ctx);
/// while !status.is_terminal() {
///     status = task.update(&mut ctx);
///     // ... advance the world ...
/// }
/// task.stop(&mut ctx);
/// ```
pub trait CoverTask {
    fn start<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus;

    fn update<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus;

    /// Release a reservation the agent has not yet occupied and cancel its
    /// path requests.  Cover already in use is kept.
    fn stop<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>);
}

/// Frees the agent's slot if it is reserved but not yet occupied.
pub(crate) fn release_reservation<L, P: Pathfinder>(ctx: &mut TaskContext<'_, L, P>) {
    let agent = ctx.agent.id;
    if ctx.table.cover_for(agent).is_some_and(|c| c.reserved) {
        ctx.table.free(agent);
    }
    ctx.pathfinder.cancel_paths(agent);
}

// ── Task ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    MoveToCover(MoveToCover),
    TakeCover(TakeCover),
}

impl Task {
    /// Build a task by name from the engine config.
    ///
    /// `params` are passed to [`MoveToCover::from_params`]; take-cover has
    /// none.  Returns `Ok(None)` for an unknown name.
    pub fn from_name<'p>(
        name:   &str,
        config: &CoverConfig,
        params: impl IntoIterator<Item = (&'p str, &'p str)>,
    ) -> CoreResult<Option<Self>> {
        Ok(match name {
            "move_to_cover" => {
                Some(Task::MoveToCover(MoveToCover::from_params(&config.move_to_cover, params)?))
            }
            "take_cover" => Some(Task::TakeCover(TakeCover::new(config.take_cover.clone()))),
            _ => None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::MoveToCover(_) => "move_to_cover",
            Task::TakeCover(_) => "take_cover",
        }
    }
}

impl From<MoveToCover> for Task {
    fn from(task: MoveToCover) -> Self {
        Task::MoveToCover(task)
    }
}

impl From<TakeCover> for Task {
    fn from(task: TakeCover) -> Self {
        Task::TakeCover(task)
    }
}

impl CoverTask for Task {
    fn start<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        match self {
            Task::MoveToCover(t) => t.start(ctx),
            Task::TakeCover(t) => t.start(ctx),
        }
    }

    fn update<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) -> TaskStatus {
        match self {
            Task::MoveToCover(t) => t.update(ctx),
            Task::TakeCover(t) => t.update(ctx),
        }
    }

    fn stop<L: LineOfSight, P: Pathfinder>(&mut self, ctx: &mut TaskContext<'_, L, P>) {
        match self {
            Task::MoveToCover(t) => t.stop(ctx),
            Task::TakeCover(t) => t.stop(ctx),
        }
    }
}
