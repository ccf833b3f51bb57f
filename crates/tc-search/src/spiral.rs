//! Outward spiral area search.
//!
//! Rings of Chebyshev radius `d` are scanned from the minimum self distance
//! outwards, so the first accepted candidate lies on the nearest ring that
//! has one.  Within a ring the result depends on traversal order, not on
//! exact distance.
//!
//! # Ring traversal
//!
//! With the ring rectangle `[lo_x, hi_x] × [lo_z, hi_z]` (already clipped to
//! the search bounds), edges are walked as one continuous perimeter:
//!
//! ```text
//!   edge 1: x = lo_x, z = lo_z ..= hi_z
//!   edge 2: z = hi_z, x = lo_x + 1 ..= hi_x
//!   edge 3: x = hi_x, z = hi_z - 1 down to lo_z
//!   edge 4: z = lo_z, x = hi_x - 1 down to lo_x + 1
//! ```
//!
//! Corners are visited once.  When clipping pulls an edge inside the ring,
//! its cells belong to an inner ring and were already tested there, so they
//! are skipped.

use std::ops::RangeInclusive;

use tracing::{debug, trace};

use tc_core::Vec3;
use tc_table::CoverTable;
use tc_world::LineOfSight;

use crate::{CoverOracle, CoverQuery};

/// Cell offsets `(dx, dz)` on ring `d`, restricted to the offset windows `x`
/// and `z`, in traversal order.
pub fn ring_offsets(
    d: i32,
    x: RangeInclusive<i32>,
    z: RangeInclusive<i32>,
) -> impl Iterator<Item = (i32, i32)> {
    let mut lo_x = (*x.start()).max(-d);
    let mut hi_x = (*x.end()).min(d);
    let mut lo_z = (*z.start()).max(-d);
    let mut hi_z = (*z.end()).min(d);
    if lo_x > hi_x || lo_z > hi_z {
        (lo_x, hi_x, lo_z, hi_z) = (0, -1, 0, -1);
    }

    let edge1 = (lo_z..=hi_z).map(move |z| (lo_x, z));
    let edge2 = (lo_x + 1..=hi_x).map(move |x| (x, hi_z));
    let edge3 = if hi_x > lo_x { lo_z..hi_z } else { 0..0 };
    let edge3 = edge3.rev().map(move |z| (hi_x, z));
    let edge4 = if hi_z > lo_z { lo_x + 1..hi_x } else { 0..0 };
    let edge4 = edge4.rev().map(move |x| (x, lo_z));

    edge1
        .chain(edge2)
        .chain(edge3)
        .chain(edge4)
        .filter(move |&(dx, dz)| dx.abs().max(dz.abs()) == d)
}

/// Candidate checks, cheapest first: quadrant, ranges, oracle, table.
pub fn is_valid_candidate<L: LineOfSight>(
    oracle:    &CoverOracle<L>,
    table:     &CoverTable,
    query:     &CoverQuery,
    candidate: Vec3,
) -> bool {
    if query.in_opposite_quadrant(candidate) {
        trace!(%candidate, "behind agent");
        return false;
    }
    if !query.in_range(candidate) {
        trace!(%candidate, "out of range");
        return false;
    }
    if !oracle.is_cover(query.strictness, candidate, query.target) {
        trace!(%candidate, "no cover");
        return false;
    }
    if !table.is_available(candidate) {
        trace!(%candidate, "held or unreachable");
        return false;
    }
    true
}

/// Scan rings around `query.origin` and return the first valid candidate.
///
/// Ring 0 is the agent's own cell and only needs the oracle and an
/// available slot.
pub fn find_cover_by_spiral_search<L: LineOfSight>(
    oracle: &CoverOracle<L>,
    table:  &CoverTable,
    query:  &CoverQuery,
) -> Option<Vec3> {
    let origin = query.origin;
    let bounds = query.bounds();
    let window = |lo: f32, hi: f32, o: f32| (lo - o).ceil() as i32..=(hi - o).floor() as i32;
    let x = window(bounds.min_x, bounds.max_x, origin.x);
    let z = window(bounds.min_z, bounds.max_z, origin.z);

    let first = query.self_min.max(0.0).ceil() as i32;
    let last = query.self_max.floor() as i32;

    for d in first..=last {
        if d == 0 {
            if oracle.is_cover(query.strictness, origin, query.target) && table.is_available(origin) {
                debug!(cover = %origin, "own cell is cover");
                return Some(origin);
            }
            continue;
        }

        for (dx, dz) in ring_offsets(d, x.clone(), z.clone()) {
            let candidate = Vec3::new(origin.x + dx as f32, origin.y, origin.z + dz as f32);
            if is_valid_candidate(oracle, table, query, candidate) {
                debug!(cover = %candidate, ring = d, "spiral search found cover");
                return Some(candidate);
            }
        }
    }

    debug!(%origin, target = %query.target, "spiral search exhausted");
    None
}
