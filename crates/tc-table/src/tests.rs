//! Unit tests for tc-table.

#[cfg(test)]
mod helpers {
    use tc_core::{Octant, Tick, Vec3};
    use crate::CoverTable;

    pub const T0: Tick = Tick(0);

    pub fn spot(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    /// Table with two catalogued spots, (3.5, 0, 0.5) and (0.5, 0, 4.5).
    pub fn two_spots() -> CoverTable {
        let mut t = CoverTable::new(T0);
        t.add_cover(spot(3.5, 0.5), Some(Octant::E), T0);
        t.add_cover(spot(0.5, 4.5), Some(Octant::N), T0);
        t
    }
}

// ── Catalogue ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod catalogue {
    use tc_core::{CoverId, GridPos, Octant, Tick, Vec3};
    use super::helpers::{spot, two_spots, T0};
    use crate::CoverTable;

    #[test]
    fn add_quantizes_to_cell_center() {
        let mut t = CoverTable::new(T0);
        let id = t.add_cover(Vec3::new(3.2, 0.0, 0.9), Some(Octant::E), T0);
        let entry = t.get(id).unwrap();
        assert_eq!(entry.position, Vec3::new(3.5, 0.0, 0.5));
        assert_eq!(entry.cell, GridPos::new(3, 0, 0));
        assert!(!entry.is_held());
    }

    #[test]
    fn add_is_idempotent_per_cell_and_touches() {
        let mut t = two_spots();
        let id = t.add_cover(spot(3.9, 0.1), Some(Octant::N), Tick(7));
        assert_eq!(id, CoverId(0));
        assert_eq!(t.len(), 2);
        let entry = t.get(id).unwrap();
        assert_eq!(entry.last_touched, Tick(7));
        // First discovery's direction is kept.
        assert_eq!(entry.direction, Some(Octant::E));
    }

    #[test]
    fn entries_iterate_in_discovery_order() {
        let mut t = two_spots();
        t.add_cover(spot(-2.5, -2.5), None, T0);
        let cells: Vec<_> = t.entries().map(|e| e.cell).collect();
        assert_eq!(cells, vec![GridPos::new(3, 0, 0), GridPos::new(0, 0, 4), GridPos::new(-3, 0, -3)]);
    }

    #[test]
    fn remove_deletes_entry_and_hold() {
        let mut t = two_spots();
        let a = tc_core::AgentId(1);
        assert!(t.reserve(a, spot(3.5, 0.5), T0));
        let removed = t.remove(spot(3.5, 0.5)).unwrap();
        assert_eq!(removed.holder, Some(a));
        assert!(t.cover_for(a).is_none());
        assert!(t.find(spot(3.5, 0.5)).is_none());
        assert_eq!(t.holder_count(), 0);
        assert!(t.remove(spot(3.5, 0.5)).is_none());
        // Plain removal leaves the cell open to a later claim.
        assert!(t.is_available(spot(3.5, 0.5)));
    }

    #[test]
    fn unreachable_cell_is_not_claimable() {
        let mut t = two_spots();
        let (a, b) = (tc_core::AgentId(1), tc_core::AgentId(2));
        assert!(t.reserve(a, spot(3.5, 0.5), T0));
        t.free(a);
        assert!(t.remove_unreachable(spot(3.2, 0.7), Tick(3)).is_some());

        assert!(t.find(spot(3.5, 0.5)).is_none());
        assert!(t.is_free(spot(3.5, 0.5)));
        assert!(t.is_unreachable(spot(3.5, 0.5)));
        assert!(!t.is_available(spot(3.5, 0.5)));
        assert!(!t.try_claim(b, spot(3.5, 0.5), None, Tick(4)));
        assert_eq!(t.len(), 1);

        // Other cells are unaffected.
        assert!(t.is_available(spot(0.5, 4.5)));
    }
}

// ── Leases ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod leases {
    use tc_core::{AgentId, Tick};
    use super::helpers::{spot, two_spots, T0};

    #[test]
    fn reserve_then_use_never_sets_both_flags() {
        let mut t = two_spots();
        let a = AgentId(0);
        assert!(t.reserve(a, spot(3.5, 0.5), T0));
        let entry = t.cover_for(a).unwrap();
        assert!(entry.reserved && !entry.in_use);
        assert!(!t.has_cover(a));

        assert!(t.mark_in_use(a, Tick(5)));
        let entry = t.cover_for(a).unwrap();
        assert!(!entry.reserved && entry.in_use);
        assert_eq!(entry.last_touched, Tick(5));
        assert!(t.has_cover(a));
    }

    #[test]
    fn reserve_missing_entry_is_noop() {
        let mut t = two_spots();
        assert!(!t.reserve(AgentId(0), spot(9.5, 9.5), T0));
        assert_eq!(t.holder_count(), 0);
    }

    #[test]
    fn mutual_exclusion() {
        let mut t = two_spots();
        let (a, b) = (AgentId(0), AgentId(1));
        assert!(t.reserve(a, spot(3.5, 0.5), T0));
        assert!(!t.is_free(spot(3.5, 0.5)));
        assert!(!t.reserve(b, spot(3.5, 0.5), T0));
        assert_eq!(t.find(spot(3.5, 0.5)).unwrap().holder, Some(a));
        assert!(t.cover_for(b).is_none());

        t.mark_in_use(a, T0);
        assert!(!t.reserve(b, spot(3.5, 0.5), T0));
    }

    #[test]
    fn reserving_elsewhere_releases_previous_hold() {
        let mut t = two_spots();
        let a = AgentId(0);
        assert!(t.reserve(a, spot(3.5, 0.5), T0));
        assert!(t.reserve(a, spot(0.5, 4.5), T0));
        assert!(t.is_free(spot(3.5, 0.5)));
        assert!(!t.find(spot(3.5, 0.5)).unwrap().is_held());
        assert_eq!(t.cover_for(a).unwrap().position, spot(0.5, 4.5));
        assert_eq!(t.holder_count(), 1);
    }

    #[test]
    fn free_is_idempotent() {
        let mut t = two_spots();
        let a = AgentId(0);
        t.reserve(a, spot(3.5, 0.5), T0);
        t.mark_in_use(a, T0);
        assert!(t.free(a));
        assert!(!t.free(a));
        assert!(t.is_free(spot(3.5, 0.5)));
        assert_eq!(t.len(), 2);
        assert!(t.find(spot(3.5, 0.5)).unwrap().holder.is_none());
    }

    #[test]
    fn mark_in_use_without_hold_fails() {
        let mut t = two_spots();
        assert!(!t.mark_in_use(AgentId(4), T0));
    }

    #[test]
    fn try_claim_checks_catalogues_and_reserves() {
        let mut t = two_spots();
        let (a, b) = (AgentId(0), AgentId(1));
        assert!(t.try_claim(a, spot(6.5, 6.5), None, T0));
        assert_eq!(t.len(), 3);
        assert!(!t.try_claim(b, spot(6.2, 6.8), None, T0));
        assert_eq!(t.cover_for(a).unwrap().position, spot(6.5, 6.5));
    }
}

// ── Purge sweep ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod purge {
    use tc_core::{AgentId, Tick};
    use super::helpers::{spot, two_spots};

    const TTL: u64 = 60;

    #[test]
    fn stale_unheld_removed_held_refreshed() {
        let mut t = two_spots();
        let a = AgentId(0);
        t.reserve(a, spot(0.5, 4.5), Tick(0));

        assert_eq!(t.purge_expired(Tick(61), TTL), Some(1));
        assert!(t.find(spot(3.5, 0.5)).is_none());
        let held = t.find(spot(0.5, 4.5)).unwrap();
        assert_eq!(held.last_touched, Tick(61));
        assert_eq!(held.holder, Some(a));
    }

    #[test]
    fn recently_touched_survives() {
        let mut t = two_spots();
        t.add_cover(spot(3.5, 0.5), None, Tick(10));
        assert_eq!(t.purge_expired(Tick(61), TTL), Some(1));
        assert!(t.find(spot(3.5, 0.5)).is_some());
        assert!(t.find(spot(0.5, 4.5)).is_none());
    }

    #[test]
    fn idle_exactly_ttl_is_kept() {
        let mut t = two_spots();
        assert_eq!(t.purge_expired(Tick(60), TTL), Some(0));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn sweep_is_throttled_to_once_per_ttl() {
        let mut t = two_spots();
        assert_eq!(t.purge_expired(Tick(30), TTL), None);
        assert_eq!(t.len(), 2);

        assert_eq!(t.purge_expired(Tick(61), TTL), Some(2));
        assert_eq!(t.last_purge(), Tick(61));

        t.add_cover(spot(1.5, 1.5), None, Tick(62));
        assert_eq!(t.purge_expired(Tick(200), TTL), Some(1));
        assert_eq!(t.purge_expired(Tick(259), TTL), None);
        assert!(t.is_empty());
    }

    #[test]
    fn freed_entry_ages_from_last_touch() {
        let mut t = two_spots();
        let a = AgentId(0);
        t.reserve(a, spot(3.5, 0.5), Tick(0));
        assert_eq!(t.purge_expired(Tick(61), TTL), Some(1));
        t.free(a);
        // Refreshed at 61, so still fresh at the 121 sweep.
        assert_eq!(t.purge_expired(Tick(121), TTL), Some(0));
        assert_eq!(t.purge_expired(Tick(150), TTL), None);
        assert_eq!(t.purge_expired(Tick(181), TTL), Some(1));
        assert!(t.is_empty());
    }

    #[test]
    fn unreachable_mark_ages_out_with_the_sweep() {
        let mut t = two_spots();
        t.remove_unreachable(spot(3.5, 0.5), Tick(10));

        // Marked 51 ticks ago: kept.
        assert_eq!(t.purge_expired(Tick(61), TTL), Some(1));
        assert!(t.is_unreachable(spot(3.5, 0.5)));

        assert_eq!(t.purge_expired(Tick(121), TTL), Some(0));
        assert!(!t.is_unreachable(spot(3.5, 0.5)));
        assert!(t.try_claim(AgentId(0), spot(3.5, 0.5), None, Tick(122)));
    }
}

// ── Shared table ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod shared {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tc_core::{AgentId, Tick};
    use super::helpers::spot;
    use crate::{CoverTable, SharedCoverTable};

    #[test]
    fn exactly_one_thread_claims_a_slot() {
        let table = SharedCoverTable::new(CoverTable::new(Tick::ZERO));
        let winners = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for i in 0..16u32 {
                let table = table.clone();
                let winners = &winners;
                s.spawn(move || {
                    if table.try_claim(AgentId(i), spot(2.5, 2.5), None, Tick::ZERO) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
        assert!(!table.is_free(spot(2.5, 2.5)));
        table.with(|t| assert_eq!(t.holder_count(), 1));
    }

    #[test]
    fn handle_forwards_lease_operations() {
        let table = SharedCoverTable::default();
        let a = AgentId(2);
        assert!(table.try_claim(a, spot(0.5, 0.5), None, Tick(1)));
        assert!(table.mark_in_use(a, Tick(2)));
        assert!(table.has_cover(a));
        assert!(table.free(a));
        assert!(table.is_free(spot(0.5, 0.5)));
        assert_eq!(table.purge_expired(Tick(3), 60), None);
    }
}
