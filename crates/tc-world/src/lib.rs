//! `tc-world`: the world-facing collaborators of the cover engine.
//!
//! The cover core never touches world geometry or navigation directly; it
//! talks to two narrow interfaces defined here.  A simple voxel world and an
//! asynchronous grid pathfinder implement them so the engine can be driven
//! end to end without a game attached.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`los`]        | `LineOfSight` trait, `RayHit`, `CollisionMask`            |
//! | [`path`]       | `Pathfinder` trait, `PathResult`                          |
//! | [`grid`]       | `VoxelGrid` (sparse voxels, raycast, support queries)     |
//! | [`pathfinder`] | `GridPathfinder` (A* resolved after a latency in ticks)   |
//! | [`error`]      | `WorldError`, `WorldResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod grid;
pub mod los;
pub mod path;
pub mod pathfinder;


pub use error::{WorldError, WorldResult};
pub use grid::{Voxel, VoxelGrid};
pub use los::{CollisionMask, LineOfSight, RayHit};
pub use path::{PathResult, Pathfinder};
pub use pathfinder::GridPathfinder;
