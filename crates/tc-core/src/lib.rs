//! `tc-core`: foundational types for the tactical cover engine.
//!
//! This crate is a dependency of every other `tc-*` crate.  It intentionally
//! has no `tc-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `CoverId`                                  |
//! | [`geom`]        | `Vec3`, `GridPos`, `Octant`, grid centering           |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SimRng` (seeded world generation)                    |
//! | [`config`]      | `CoverConfig`, per-task tuning, `DistanceRange`       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    BodyOffsets, CoverConfig, CoverStrictness, DistanceRange, MoveToCoverConfig, TakeCoverConfig,
};
pub use error::{CoreError, CoreResult};
pub use geom::{GridPos, Octant, Vec3};
pub use ids::{AgentId, CoverId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
