//! Cover validity predicates.

use tc_core::{BodyOffsets, CoverStrictness, Vec3};
use tc_world::{CollisionMask, LineOfSight};

/// Decides whether a candidate cell shelters an agent from a threat.
///
/// `candidate` is the point an agent would stand on (cell-centered, feet
/// level); body offsets lift it to torso and eye height.  `threat` is the
/// point fire comes from.
pub struct CoverOracle<L> {
    los:  L,
    mask: CollisionMask,
    body: BodyOffsets,
}

impl<L: LineOfSight> CoverOracle<L> {
    pub fn new(los: L, mask: CollisionMask, body: BodyOffsets) -> Self {
        Self { los, mask, body }
    }

    #[inline]
    pub fn los(&self) -> &L {
        &self.los
    }

    #[inline]
    pub fn mask(&self) -> CollisionMask {
        self.mask
    }

    #[inline]
    pub fn body(&self) -> BodyOffsets {
        self.body
    }

    /// Fire from `threat` cannot reach the torso.
    pub fn is_basic_cover(&self, candidate: Vec3, threat: Vec3) -> bool {
        self.los.is_blocked(threat, candidate.up(self.body.torso), self.mask)
    }

    /// Basic cover, and the agent can still see the threat over it.
    pub fn is_peeking_cover(&self, candidate: Vec3, threat: Vec3) -> bool {
        self.is_basic_cover(candidate, threat)
            && !self.los.is_blocked(threat, candidate.up(self.body.eye), self.mask)
    }

    pub fn is_cover(&self, strictness: CoverStrictness, candidate: Vec3, threat: Vec3) -> bool {
        match strictness {
            CoverStrictness::Basic => self.is_basic_cover(candidate, threat),
            CoverStrictness::Peeking => self.is_peeking_cover(candidate, threat),
        }
    }
}
