//! Thread-safe handle for callers that drive agents from real threads.
//!
//! Every method takes the lock once, so check-and-set sequences such as
//! [`try_claim`][SharedCoverTable::try_claim] cannot interleave with another
//! thread's.  A poisoned lock is recovered: table operations leave it
//! consistent after every individual call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tc_core::{AgentId, Octant, Tick, Vec3};

use crate::CoverTable;

#[derive(Debug, Clone, Default)]
pub struct SharedCoverTable {
    inner: Arc<Mutex<CoverTable>>,
}

impl SharedCoverTable {
    pub fn new(table: CoverTable) -> Self {
        Self { inner: Arc::new(Mutex::new(table)) }
    }

    fn lock(&self) -> MutexGuard<'_, CoverTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the table.
    pub fn with<R>(&self, f: impl FnOnce(&mut CoverTable) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn try_claim(&self, agent: AgentId, position: Vec3, direction: Option<Octant>, now: Tick) -> bool {
        self.lock().try_claim(agent, position, direction, now)
    }

    pub fn mark_in_use(&self, agent: AgentId, now: Tick) -> bool {
        self.lock().mark_in_use(agent, now)
    }

    pub fn free(&self, agent: AgentId) -> bool {
        self.lock().free(agent)
    }

    pub fn is_free(&self, position: Vec3) -> bool {
        self.lock().is_free(position)
    }

    pub fn has_cover(&self, agent: AgentId) -> bool {
        self.lock().has_cover(agent)
    }

    pub fn purge_expired(&self, now: Tick, ttl: u64) -> Option<usize> {
        self.lock().purge_expired(now, ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
