//! `tc-table`: the cover reservation table.
//!
//! Known cover positions persist across agents and time; who currently holds
//! one is tracked separately, per agent.  Many agents can therefore discover
//! and reuse the same catalogue while entries nobody claims age out.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`position`] | `CoverPosition` (one catalogued cell and its lease)     |
//! | [`table`]    | `CoverTable` (catalogue, holder map, purge sweep)       |
//! | [`shared`]   | `SharedCoverTable` (`Arc<Mutex<CoverTable>>` wrapper)   |
//!
//! # Lease lifecycle
//!
//! ```text
//! free ──reserve──▶ reserved ──mark_in_use──▶ in use
//!   ▲                  │                        │
//!   └──────free────────┴──────────free──────────┘
//! ```
//!
//! An entry is never both reserved and in use, and an agent holds at most one
//! entry at a time.  Unheld entries untouched for longer than the TTL are
//! removed by [`CoverTable::purge_expired`]; held entries are refreshed by it
//! instead, so the TTL measures inactivity rather than age.

pub mod position;
pub mod shared;
pub mod table;

#[cfg(test)]
mod tests;

pub use position::CoverPosition;
pub use shared::SharedCoverTable;
pub use table::CoverTable;
