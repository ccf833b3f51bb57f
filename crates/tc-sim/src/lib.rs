//! `tc-sim`: tick scheduler for the tactical cover engine.
//!
//! # Tick loop
//!
//! ```text
//! every tick:
//!   ① Paths        Pathfinder::poll resolves requests whose latency elapsed.
//!   ② Purge        CoverTable::purge_expired, at most once per cover TTL.
//!   ③ Tasks        in ascending AgentId order:
//!                     first tick   → start, then update if still running
//!                     later ticks  → update
//!                     Done/Failed  → stop, record the outcome
//!   ④ Locomotion   walk each agent along its current path.
//! ```
//!
//! Tasks that wait on a path return `Continue` and are polled again next
//! tick; nothing blocks inside a tick.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use tc_core::{AgentId, CoverConfig, Vec3};
//! use tc_sim::{NoopObserver, SimBuilder};
//! use tc_task::{MoveToCover, Threat};
//! use tc_world::{GridPathfinder, VoxelGrid};
//!
//! let grid = Arc::new(VoxelGrid::from_ascii(MAP, 2)?);
//! let mut sim = SimBuilder::new(CoverConfig::default(), grid.clone(), GridPathfinder::new(grid, 2))
//!     .spawn(Vec3::new(0.5, 0.0, 0.5))
//!     .threat(AgentId(0), Threat::new(Vec3::new(10.5, 0.0, 0.5)))
//!     .build()?;
//! sim.assign_task(AgentId(0), MoveToCover::default())?;
//! sim.run_until_idle(400, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod locomotion;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
