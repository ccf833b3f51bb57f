//! Compass compass casts.
//!
//! Both helpers cast one ray along each [`Octant`] in
//! [`Octant::CAST_ORDER`]; ties keep the earlier octant.

use tc_core::{GridPos, Octant, Vec3};
use tc_world::{CollisionMask, LineOfSight};

/// Height above the cell center that compass casts start from.
const CAST_LIFT: f32 = 0.15;

/// How far a hit point is pushed off the struck face, into open space.
const HIT_NUDGE: f32 = 0.1;

/// A compass cast that struck geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoverCast {
    pub octant: Octant,
    /// Where the cast started.
    pub origin: Vec3,
    /// Hit point nudged off the struck face.
    pub point: Vec3,
    /// Distance from the raw hit point to the threat.
    pub threat_distance: f32,
}

/// Cast from the center of `point`'s cell in every compass direction and
/// return the hit that lands nearest `threat`.  `None` when nothing within
/// `distance` is struck.
pub fn best_cover_cast<L: LineOfSight + ?Sized>(
    los:      &L,
    mask:     CollisionMask,
    point:    Vec3,
    threat:   Vec3,
    distance: f32,
) -> Option<CoverCast> {
    let origin = GridPos::from_world(point).center().up(CAST_LIFT);
    let mut best: Option<CoverCast> = None;

    for octant in Octant::CAST_ORDER {
        let Some(hit) = los.raycast(origin, origin + octant.unit() * distance, mask) else {
            continue;
        };
        let threat_distance = hit.point.distance(threat);
        if best.is_none_or(|b| threat_distance < b.threat_distance) {
            best = Some(CoverCast {
                octant,
                origin,
                point: hit.point + hit.normal * HIT_NUDGE,
                threat_distance,
            });
        }
    }
    best
}

/// The compass direction whose cast from `origin` hits geometry soonest.
pub fn nearest_blocking_direction<L: LineOfSight + ?Sized>(
    los:      &L,
    mask:     CollisionMask,
    origin:   Vec3,
    distance: f32,
) -> Option<Octant> {
    Octant::CAST_ORDER
        .into_iter()
        .filter_map(|octant| {
            los.raycast(origin, origin + octant.unit() * distance, mask)
                .map(|hit| (hit.distance, octant))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, octant)| octant)
}
