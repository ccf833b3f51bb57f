//! World-space vectors, grid quantization and compass octants.
//!
//! The world is a voxel grid with unit cells.  `y` is up; the horizontal
//! plane is `x`/`z` with `+z` as north and `+x` as east.  All cover
//! positions are stored *centered* in their cell horizontally and floored
//! vertically (see [`GridPos::center_xz`]), so two searches that land in
//! the same cell always produce bit-identical positions.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// `√2`, used to snap a unit vector onto the eight compass bearings.
const SQRT_2: f32 = std::f32::consts::SQRT_2;

// ── Vec3 ──────────────────────────────────────────────────────────────────────

/// A single-precision world-space point or direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared length.  Prefer this over [`magnitude`][Self::magnitude] for
    /// comparisons; it avoids the square root.
    #[inline]
    pub fn sqr_magnitude(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn magnitude(self) -> f32 {
        self.sqr_magnitude().sqrt()
    }

    /// Squared distance between two points.
    #[inline]
    pub fn sqr_distance(self, other: Vec3) -> f32 {
        (self - other).sqr_magnitude()
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        self.sqr_distance(other).sqrt()
    }

    /// Unit vector in the same direction, or `ZERO` for a (near) zero vector.
    pub fn normalized(self) -> Vec3 {
        let len = self.magnitude();
        if len <= f32::EPSILON {
            Vec3::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Same point with `y` replaced.
    #[inline]
    pub fn with_y(self, y: f32) -> Vec3 {
        Vec3 { y, ..self }
    }

    /// Same point raised by `offset` along `y`.
    #[inline]
    pub fn up(self, offset: f32) -> Vec3 {
        Vec3 { y: self.y + offset, ..self }
    }

    /// Horizontal (x/z) component only.
    #[inline]
    pub fn flat(self) -> Vec3 {
        Vec3 { y: 0.0, ..self }
    }

    /// Quantize to the containing cell, centered in x/z, floored in y.
    #[inline]
    pub fn center_xz(self) -> Vec3 {
        GridPos::from_world(self).center_xz()
    }

    /// Quantize to the containing cell and return its center.
    #[inline]
    pub fn center(self) -> Vec3 {
        GridPos::from_world(self).center()
    }

    /// Containing grid cell.
    #[inline]
    pub fn cell(self) -> GridPos {
        GridPos::from_world(self)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── GridPos ───────────────────────────────────────────────────────────────────

/// Integer coordinates of a unit voxel cell.
///
/// Conversion from world space floors each axis, so `-0.2` lands in cell
/// `-1` rather than `0`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn from_world(v: Vec3) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    /// Cell center on every axis.
    #[inline]
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32 + 0.5, self.z as f32 + 0.5)
    }

    /// Cell center horizontally, cell floor vertically: the point an agent
    /// standing in this cell occupies.
    #[inline]
    pub fn center_xz(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32, self.z as f32 + 0.5)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn below(self) -> GridPos {
        self.offset(0, -1, 0)
    }

    #[inline]
    pub fn above(self) -> GridPos {
        self.offset(0, 1, 0)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

// ── Octant ────────────────────────────────────────────────────────────────────

/// One of the eight horizontal compass bearings.
///
/// Used both to bucket cover entries by the bearing they protect against and
/// as the fixed set of ray-cast directions when probing for nearby walls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Octant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Octant {
    /// Order in which cover casts are evaluated.  Ties between equally good
    /// casts go to the earlier entry: cardinals first, then diagonals.
    pub const CAST_ORDER: [Octant; 8] = [
        Octant::N,
        Octant::E,
        Octant::S,
        Octant::W,
        Octant::NE,
        Octant::SE,
        Octant::SW,
        Octant::NW,
    ];

    /// Snap a direction to the nearest compass bearing.
    ///
    /// Only the horizontal part of `direction` is considered.  Returns `None`
    /// for a vertical or zero vector.
    pub fn from_direction(direction: Vec3) -> Option<Octant> {
        let flat = direction.flat().normalized();
        let sx = (flat.x * SQRT_2).round() as i32;
        let sz = (flat.z * SQRT_2).round() as i32;
        Octant::from_signs(sx.signum(), sz.signum())
    }

    /// Map a pair of axis signs (`-1`, `0`, `1`) to an octant.
    pub fn from_signs(sx: i32, sz: i32) -> Option<Octant> {
        match (sx, sz) {
            (0, 1) => Some(Octant::N),
            (1, 1) => Some(Octant::NE),
            (1, 0) => Some(Octant::E),
            (1, -1) => Some(Octant::SE),
            (0, -1) => Some(Octant::S),
            (-1, -1) => Some(Octant::SW),
            (-1, 0) => Some(Octant::W),
            (-1, 1) => Some(Octant::NW),
            _ => None,
        }
    }

    /// Axis signs `(x, z)` of this bearing.
    pub fn signs(self) -> (i32, i32) {
        match self {
            Octant::N => (0, 1),
            Octant::NE => (1, 1),
            Octant::E => (1, 0),
            Octant::SE => (1, -1),
            Octant::S => (0, -1),
            Octant::SW => (-1, -1),
            Octant::W => (-1, 0),
            Octant::NW => (-1, 1),
        }
    }

    /// Horizontal unit vector pointing along this bearing.
    pub fn unit(self) -> Vec3 {
        let (sx, sz) = self.signs();
        Vec3::new(sx as f32, 0.0, sz as f32).normalized()
    }

    /// The bearing pointing the other way.
    pub fn opposite(self) -> Octant {
        let (sx, sz) = self.signs();
        // Every octant has a non-zero sign pair, so the negation maps back.
        Octant::from_signs(-sx, -sz).unwrap_or(self)
    }
}

impl fmt::Display for Octant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
