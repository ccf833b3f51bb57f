//! Path-projected cover search.
//!
//! Given a path the agent was already sent along, cast around each
//! waypoint for nearby walls and collect the cover spots they provide.
//! Candidates are buffered and the nearest one to the agent is chosen once
//! `candidate_buffer` waypoints have yielded one, or the path runs out.
//! A waypoint whose cast lands on an already buffered cell still counts,
//! so a long straight wall does not keep the search casting to the end.

use tracing::{debug, trace};

use tc_core::{CoverStrictness, GridPos, Octant, Vec3};
use tc_table::CoverTable;
use tc_world::LineOfSight;

use crate::{CoverOracle, best_cover_cast};

/// Inputs for [`find_cover_along_path`].
#[derive(Copy, Clone, Debug)]
pub struct PathSearch<'a> {
    pub waypoints:        &'a [Vec3],
    /// Agent's current position; candidates are ranked by distance to it.
    pub agent_position:   Vec3,
    /// Absolute hip height waypoints are lifted to before probing.
    pub hip_y:            f32,
    /// Threat hip position; cast hits nearest it win.
    pub threat_hip:       Vec3,
    /// Point fire is tested from.
    pub threat:           Vec3,
    pub cast_distance:    f32,
    /// Selection window, in waypoints that yielded a candidate.
    pub candidate_buffer: usize,
    pub strictness:       CoverStrictness,
}

/// Cover chosen along a path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectedCover {
    pub position:  Vec3,
    /// Bearing of the cast that found it.
    pub direction: Option<Octant>,
}

pub fn find_cover_along_path<L: LineOfSight>(
    oracle: &CoverOracle<L>,
    table:  &CoverTable,
    search: &PathSearch<'_>,
) -> Option<ProjectedCover> {
    let mut buffer: Vec<ProjectedCover> = Vec::with_capacity(search.candidate_buffer);
    let mut yielded = 0usize;
    let last = search.waypoints.len().checked_sub(1)?;

    for (i, &waypoint) in search.waypoints.iter().enumerate() {
        let hip = waypoint.with_y(search.hip_y);
        if let Some(cast) =
            best_cover_cast(oracle.los(), oracle.mask(), hip, search.threat_hip, search.cast_distance)
        {
            let cell = GridPos::from_world(cast.point.with_y(waypoint.y));
            let candidate = ProjectedCover { position: cell.center_xz(), direction: Some(cast.octant) };

            if buffer.iter().any(|c| c.position == candidate.position) {
                trace!(cover = %candidate.position, "already buffered");
                yielded += 1;
            } else if oracle.is_cover(search.strictness, candidate.position, search.threat) {
                buffer.push(candidate);
                yielded += 1;
            } else {
                trace!(cover = %candidate.position, "cast hit gives no cover");
            }
        }

        if yielded >= search.candidate_buffer.max(1) || (i == last && !buffer.is_empty()) {
            trace!(waypoints = i + 1, yielded, "selecting path cover");
            return select_nearest(oracle, table, search, &buffer);
        }
    }

    debug!(waypoints = search.waypoints.len(), "no cover along path");
    None
}

/// Nearest buffered candidate that still gives cover and is available.
fn select_nearest<L: LineOfSight>(
    oracle: &CoverOracle<L>,
    table:  &CoverTable,
    search: &PathSearch<'_>,
    buffer: &[ProjectedCover],
) -> Option<ProjectedCover> {
    let chosen = buffer
        .iter()
        .filter(|c| oracle.is_cover(search.strictness, c.position, search.threat))
        .filter(|c| table.is_available(c.position))
        .min_by(|a, b| {
            let da = a.position.sqr_distance(search.agent_position);
            let db = b.position.sqr_distance(search.agent_position);
            da.total_cmp(&db)
        })
        .copied();

    match chosen {
        Some(cover) => debug!(cover = %cover.position, candidates = buffer.len(), "path cover selected"),
        None => debug!(candidates = buffer.len(), "no buffered candidate is usable"),
    }
    chosen
}
