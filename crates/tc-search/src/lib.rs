//! `tc-search`: finding cover.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`oracle`]    | `CoverOracle` (basic and peeking cover predicates)        |
//! | [`bounds`]    | `SearchBounds`, `CoverQuery` (ranges, guards, quadrant)   |
//! | [`spiral`]    | `ring_offsets`, `find_cover_by_spiral_search`             |
//! | [`existing`]  | `find_existing_cover` (reuse of catalogued cover)         |
//! | [`casts`]     | `best_cover_cast`, `nearest_blocking_direction`           |
//! | [`projected`] | `find_cover_along_path`, `ProjectedCover`                 |
//!
//! # Check ordering
//!
//! The oracle issues raycasts and dominates search cost.  Every composite
//! test runs the cheap geometric checks (quadrant, distance ranges) first,
//! then the oracle, then the table lookup.

pub mod bounds;
pub mod casts;
pub mod existing;
pub mod oracle;
pub mod projected;
pub mod spiral;


pub use bounds::{CoverQuery, SearchBounds};
pub use casts::{CoverCast, best_cover_cast, nearest_blocking_direction};
pub use existing::find_existing_cover;
pub use oracle::CoverOracle;
pub use projected::{PathSearch, ProjectedCover, find_cover_along_path};
pub use spiral::{find_cover_by_spiral_search, ring_offsets};
