//! `CoverTable`: catalogue of known cover positions and their holders.
//!
//! # Storage
//!
//! | Field         | Type                               | Role                           |
//! |---------------|------------------------------------|--------------------------------|
//! | `entries`     | `BTreeMap<CoverId, CoverPosition>` | catalogue, insertion ordered   |
//! | `by_cell`     | `FxHashMap<GridPos, CoverId>`      | position lookup                |
//! | `holders`     | `FxHashMap<AgentId, CoverId>`      | at most one hold per agent     |
//! | `unreachable` | `FxHashMap<GridPos, Tick>`         | cells a path search gave up on |
//!
//! Ids are assigned monotonically, so iterating `entries` visits cover in the
//! order it was discovered.  Iteration borrows the table immutably; a caller
//! that wants to mutate while scanning collects ids first.
//!
//! A cell removed with [`CoverTable::remove_unreachable`] is not offered
//! again until a purge sweep finds the mark older than the TTL.
//!
//! # Concurrency
//!
//! The table itself is a plain single-writer value.  The scheduler advances
//! agents one at a time, so an `is_free` → `reserve` sequence cannot be
//! interleaved with another agent's.  Threaded callers go through
//! [`SharedCoverTable`][crate::SharedCoverTable].

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use tc_core::{AgentId, CoverId, GridPos, Octant, Tick, Vec3};

use crate::CoverPosition;

#[derive(Debug, Clone, Default)]
pub struct CoverTable {
    entries:     BTreeMap<CoverId, CoverPosition>,
    by_cell:     FxHashMap<GridPos, CoverId>,
    holders:     FxHashMap<AgentId, CoverId>,
    /// Cell → tick a path there was reported impossible.
    unreachable: FxHashMap<GridPos, Tick>,
    next_id:     u32,
    /// Tick of the last purge sweep; the first sweep is timed from the
    /// table's construction.
    last_purge:  Tick,
}

impl CoverTable {
    /// An empty table created at tick `now`.
    pub fn new(now: Tick) -> Self {
        Self { last_purge: now, ..Self::default() }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = &CoverPosition> {
        self.entries.values()
    }

    #[inline]
    pub fn get(&self, id: CoverId) -> Option<&CoverPosition> {
        self.entries.get(&id)
    }

    /// The entry covering the cell that contains `position`.
    pub fn find(&self, position: Vec3) -> Option<&CoverPosition> {
        let id = self.by_cell.get(&GridPos::from_world(position))?;
        self.entries.get(id)
    }

    /// Number of agents currently holding an entry.
    #[inline]
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    #[inline]
    pub fn last_purge(&self) -> Tick {
        self.last_purge
    }

    // ── Lease queries ─────────────────────────────────────────────────────

    /// `true` unless an entry at `position`'s cell is reserved or in use.
    pub fn is_free(&self, position: Vec3) -> bool {
        self.find(position).is_none_or(|entry| !entry.is_held())
    }

    /// A path to `position`'s cell failed and the mark has not aged out.
    pub fn is_unreachable(&self, position: Vec3) -> bool {
        self.unreachable.contains_key(&GridPos::from_world(position))
    }

    /// Free, and not marked unreachable.  Searches propose only these cells.
    pub fn is_available(&self, position: Vec3) -> bool {
        self.is_free(position) && !self.is_unreachable(position)
    }

    /// The entry `agent` currently holds, reserved or in use.
    pub fn cover_for(&self, agent: AgentId) -> Option<&CoverPosition> {
        let id = self.holders.get(&agent)?;
        self.entries.get(id)
    }

    /// `agent` holds an entry that is in use (not merely reserved).
    pub fn has_cover(&self, agent: AgentId) -> bool {
        self.cover_for(agent).is_some_and(|entry| entry.in_use)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Catalogue `position` unless its cell is already known.  Either way the
    /// entry is touched and its id returned.
    pub fn add_cover(&mut self, position: Vec3, direction: Option<Octant>, now: Tick) -> CoverId {
        let cell = GridPos::from_world(position);
        if let Some(&id) = self.by_cell.get(&cell) {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.last_touched = now;
            }
            return id;
        }

        let id = CoverId(self.next_id);
        self.next_id += 1;
        let entry = CoverPosition::new(id, position, direction, now);
        trace!(%id, %cell, "cover catalogued");
        self.by_cell.insert(cell, id);
        self.entries.insert(id, entry);
        id
    }

    /// Reserve the entry at `position` for `agent`.
    ///
    /// Returns `false` without changes when no entry exists there or another
    /// agent holds it.  A different entry the agent already holds is released
    /// first.
    pub fn reserve(&mut self, agent: AgentId, position: Vec3, now: Tick) -> bool {
        let Some(&id) = self.by_cell.get(&GridPos::from_world(position)) else {
            return false;
        };
        let Some(entry) = self.entries.get(&id) else {
            return false;
        };
        match entry.holder {
            Some(holder) if holder == agent => return true,
            Some(_) => return false,
            None => {}
        }

        if self.holders.get(&agent).is_some_and(|&held| held != id) {
            self.free(agent);
        }

        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.reserved = true;
        entry.in_use = false;
        entry.holder = Some(agent);
        entry.last_touched = now;
        self.holders.insert(agent, id);
        trace!(%agent, %id, "cover reserved");
        true
    }

    /// Promote `agent`'s reserved entry to in use.  Returns `false` when the
    /// agent holds nothing.
    pub fn mark_in_use(&mut self, agent: AgentId, now: Tick) -> bool {
        let Some(id) = self.holders.get(&agent) else {
            return false;
        };
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        entry.reserved = false;
        entry.in_use = true;
        entry.last_touched = now;
        trace!(%agent, id = %entry.id, "cover in use");
        true
    }

    /// Release whatever `agent` holds.  The entry stays catalogued.  Returns
    /// `true` if something was released; calling it again is a no-op.
    pub fn free(&mut self, agent: AgentId) -> bool {
        let Some(id) = self.holders.remove(&agent) else {
            return false;
        };
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.release();
        }
        trace!(%agent, %id, "cover freed");
        true
    }

    /// Delete the entry at `position` and any hold on it.
    pub fn remove(&mut self, position: Vec3) -> Option<CoverPosition> {
        let id = self.by_cell.remove(&GridPos::from_world(position))?;
        let entry = self.entries.remove(&id)?;
        if let Some(holder) = entry.holder {
            self.holders.remove(&holder);
        }
        trace!(%id, cell = %entry.cell, "cover removed");
        Some(entry)
    }

    /// Delete the entry at `position` and mark its cell unreachable, so the
    /// next search does not propose it again.
    pub fn remove_unreachable(&mut self, position: Vec3, now: Tick) -> Option<CoverPosition> {
        let cell = GridPos::from_world(position);
        self.unreachable.insert(cell, now);
        debug!(%cell, tick = %now, "cover marked unreachable");
        self.remove(position)
    }

    /// Check that `position` is available, catalogue it and reserve it for
    /// `agent`, as one step.
    pub fn try_claim(
        &mut self,
        agent:     AgentId,
        position:  Vec3,
        direction: Option<Octant>,
        now:       Tick,
    ) -> bool {
        if !self.is_available(position) {
            return false;
        }
        self.add_cover(position, direction, now);
        self.reserve(agent, position, now)
    }

    /// Expire entries nobody has touched for more than `ttl` ticks.
    ///
    /// Runs at most once per `ttl`: returns `None` when the previous sweep
    /// was less than `ttl` ticks ago.  Otherwise held entries are refreshed,
    /// stale unheld entries are removed, and the number removed is returned.
    /// Unreachable marks older than `ttl` are dropped in the same sweep.
    pub fn purge_expired(&mut self, now: Tick, ttl: u64) -> Option<usize> {
        if now.since(self.last_purge) < ttl {
            return None;
        }
        self.last_purge = now;

        let mut expired = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.is_held() {
                entry.last_touched = now;
            } else if entry.idle_ticks(now) > ttl {
                expired.push(entry.id);
            }
        }

        for id in &expired {
            if let Some(entry) = self.entries.remove(id) {
                self.by_cell.remove(&entry.cell);
            }
        }
        self.unreachable.retain(|_, marked| now.since(*marked) <= ttl);
        debug!(
            tick = %now,
            purged = expired.len(),
            remaining = self.entries.len(),
            unreachable = self.unreachable.len(),
            "cover purge"
        );
        Some(expired.len())
    }
}
