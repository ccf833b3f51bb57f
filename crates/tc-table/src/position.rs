//! A single catalogued cover position.

use tc_core::{AgentId, CoverId, GridPos, Octant, Tick, Vec3};

/// A grid cell judged to give cover from some bearing, plus its lease state.
///
/// Entries are keyed by `cell`; `position` is the cell-centered point agents
/// walk to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverPosition {
    pub id:           CoverId,
    pub position:     Vec3,
    pub cell:         GridPos,
    /// Bearing this spot covers from; `None` when the agent stood on the
    /// threat's own column when it was found.
    pub direction:    Option<Octant>,
    pub reserved:     bool,
    pub in_use:       bool,
    pub last_touched: Tick,
    pub holder:       Option<AgentId>,
}

impl CoverPosition {
    pub(crate) fn new(id: CoverId, position: Vec3, direction: Option<Octant>, now: Tick) -> Self {
        let cell = GridPos::from_world(position);
        Self {
            id,
            position: cell.center_xz(),
            cell,
            direction,
            reserved: false,
            in_use: false,
            last_touched: now,
            holder: None,
        }
    }

    /// Reserved or in use by some agent.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.reserved || self.in_use
    }

    #[inline]
    pub fn is_held_by(&self, agent: AgentId) -> bool {
        self.holder == Some(agent)
    }

    /// Ticks since the entry was last touched.
    #[inline]
    pub fn idle_ticks(&self, now: Tick) -> u64 {
        now.since(self.last_touched)
    }

    pub(crate) fn release(&mut self) {
        self.reserved = false;
        self.in_use = false;
        self.holder = None;
    }
}
