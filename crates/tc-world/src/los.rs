//! Line-of-sight interface.
//!
//! # Pluggability
//!
//! The cover oracle calls raycasts through the [`LineOfSight`] trait, so a
//! game can answer them from its physics scene while tests answer them from
//! a scripted stub.  The reference implementation is
//! [`VoxelGrid`][crate::VoxelGrid].

use std::ops::BitOr;

use tc_core::Vec3;

/// Which projectile classes a voxel stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const NONE: CollisionMask = CollisionMask(0);
    pub const ARROWS: CollisionMask = CollisionMask(1 << 0);
    pub const BULLETS: CollisionMask = CollisionMask(1 << 1);
    pub const ROCKETS: CollisionMask = CollisionMask(1 << 2);
    /// Everything a ranged attack can be.  Cover tests use this mask.
    pub const PROJECTILES: CollisionMask =
        CollisionMask(Self::ARROWS.0 | Self::BULLETS.0 | Self::ROCKETS.0);

    /// `true` when the two masks share at least one class.
    #[inline]
    pub fn intersects(self, other: CollisionMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CollisionMask {
    type Output = CollisionMask;
    #[inline]
    fn bitor(self, rhs: CollisionMask) -> CollisionMask {
        CollisionMask(self.0 | rhs.0)
    }
}

/// Where a ray stopped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// World-space point where the ray entered the blocking geometry.
    pub point: Vec3,
    /// Outward normal of the face that was hit.
    pub normal: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Raycast queries against world geometry.
pub trait LineOfSight {
    /// Cast a ray from `from` to `to`.  Returns the first hit on geometry
    /// whose collision mask intersects `mask`, or `None` when the segment is
    /// clear.  Geometry enclosing `from` itself is ignored.
    fn raycast(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<RayHit>;

    /// `true` when something in `mask` blocks the segment `from → to`.
    fn is_blocked(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> bool {
        self.raycast(from, to, mask).is_some()
    }
}

impl<T: LineOfSight + ?Sized> LineOfSight for &T {
    fn raycast(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<RayHit> {
        (**self).raycast(from, to, mask)
    }

    fn is_blocked(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> bool {
        (**self).is_blocked(from, to, mask)
    }
}

impl<T: LineOfSight + ?Sized> LineOfSight for std::sync::Arc<T> {
    fn raycast(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<RayHit> {
        (**self).raycast(from, to, mask)
    }

    fn is_blocked(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> bool {
        (**self).is_blocked(from, to, mask)
    }
}
