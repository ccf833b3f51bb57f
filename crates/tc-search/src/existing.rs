//! Reuse of catalogued cover.

use tracing::debug;

use tc_core::{Octant, Vec3};
use tc_table::CoverTable;
use tc_world::LineOfSight;

use crate::{CoverOracle, CoverQuery};

/// Nearest unheld, reachable table entry that suits `query`: inside the search bounds,
/// catalogued for the same bearing, within both distance ranges and still
/// passing the oracle.
pub fn find_existing_cover<L: LineOfSight>(
    oracle: &CoverOracle<L>,
    table:  &CoverTable,
    query:  &CoverQuery,
) -> Option<Vec3> {
    let bearing = Octant::from_direction(query.direction());
    let bounds = query.bounds();

    let best = table
        .entries()
        .filter(|e| !e.is_held() && !table.is_unreachable(e.position))
        .filter(|e| e.direction == bearing)
        .filter(|e| bounds.contains_xz(e.position))
        .filter(|e| query.in_range(e.position))
        .filter(|e| oracle.is_cover(query.strictness, e.position, query.target))
        .map(|e| (query.origin.sqr_distance(e.position), e.position))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, position)| position);

    if let Some(cover) = best {
        debug!(%cover, "reusing catalogued cover");
    }
    best
}
