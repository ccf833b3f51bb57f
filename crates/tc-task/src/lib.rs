//! `tc-task`: the per-agent controllers that drive an agent into cover.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                   |
//! |-------------------|------------------------------------------------------------|
//! | [`context`]       | `AgentState`, `Threat`, `TaskContext<'a, L, P>`            |
//! | [`status`]        | `TaskStatus`, `FailReason`                                 |
//! | [`move_to_cover`] | `MoveToCover` (area search, re-evaluated every tick)       |
//! | [`take_cover`]    | `TakeCover` (path-projected search, explicit states)       |
//! | [`task`]          | `CoverTask` trait, `Task` enum dispatching to the two      |
//!
//! # Lifecycle
//!
//! The scheduler calls `start` once, then `update` once per tick until it
//! returns `Done` or `Failed`, then `stop`.  `stop` is also the
//! cancellation path: it releases a reservation the agent has not yet
//! occupied and cancels any outstanding path request, so an interrupted
//! task never leaks a slot or a path job.
//!
//! Tasks never block.  Waiting on the pathfinder means returning
//! `Continue` and checking again next tick.

pub mod context;
pub mod move_to_cover;
pub mod status;
pub mod take_cover;
pub mod task;

#[cfg(test)]
mod tests;

pub use context::{AgentState, TaskContext, Threat};
pub use move_to_cover::MoveToCover;
pub use status::{FailReason, TaskStatus};
pub use take_cover::{TakeCover, TakeCoverState};
pub use task::{CoverTask, Task};
