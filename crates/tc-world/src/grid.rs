//! Sparse voxel world.
//!
//! # Data layout
//!
//! Only non-air cells are stored, in an `FxHashMap<GridPos, Voxel>`.  Air is
//! the absence of an entry.  Agents stand *in* an air cell whose cell below
//! blocks movement; an agent is two cells tall, so the cell above must be
//! air as well.
//!
//! # Raycasts
//!
//! [`LineOfSight`] is implemented with a voxel traversal (Amanatides & Woo):
//! the ray visits every cell it crosses in order, so the first blocking cell
//! found is the nearest one and the entry face gives the hit normal.

use rustc_hash::FxHashMap;
use tracing::debug;

use tc_core::{GridPos, SimRng, Vec3};

use crate::{CollisionMask, LineOfSight, RayHit, WorldError, WorldResult};

/// How far `supporting_cell` searches downward for ground.
const MAX_SUPPORT_DROP: i32 = 64;

/// How far `supporting_cell` climbs out of solid geometry.
const MAX_SUPPORT_CLIMB: i32 = 8;

// ── Voxel ─────────────────────────────────────────────────────────────────────

/// A non-air cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Voxel {
    /// Agents cannot enter this cell and can stand on top of it.
    pub blocks_movement: bool,
    /// Projectile classes stopped by this cell.
    pub collides: CollisionMask,
}

impl Voxel {
    /// Solid ground or wall: blocks movement and every projectile.
    pub const SOLID: Voxel = Voxel {
        blocks_movement: true,
        collides:        CollisionMask::PROJECTILES,
    };

    /// Something agents cannot walk through but projectiles pass (a fence).
    pub const FENCE: Voxel = Voxel {
        blocks_movement: true,
        collides:        CollisionMask::NONE,
    };
}

// ── VoxelGrid ─────────────────────────────────────────────────────────────────

/// Sparse voxel world used as the reference line-of-sight and navigation
/// collaborator.
#[derive(Clone, Debug, Default)]
pub struct VoxelGrid {
    voxels: FxHashMap<GridPos, Voxel>,
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an ASCII map, one text row per `z` (first row is `z = 0`), one
    /// column per `x`.  Every glyph except a space gets a solid floor at
    /// `y = -1`; agents stand at `y = 0`.
    ///
    /// | Glyph | Meaning                                    |
    /// |-------|--------------------------------------------|
    /// | `.`   | open floor                                 |
    /// | `#`   | wall `wall_height` cells tall              |
    /// | `=`   | low wall, one cell tall (peeking cover)    |
    /// | ` `   | void, no floor                             |
    pub fn from_ascii(map: &str, wall_height: i32) -> WorldResult<Self> {
        let mut grid = VoxelGrid::new();
        let mut rows = 0usize;

        for (row, line) in map.lines().enumerate() {
            rows += 1;
            for (col, glyph) in line.chars().enumerate() {
                let (x, z) = (col as i32, row as i32);
                match glyph {
                    ' ' => continue,
                    '.' => {}
                    '#' => grid.add_column(x, z, 0, wall_height),
                    '=' => grid.add_column(x, z, 0, 1),
                    other => {
                        return Err(WorldError::UnknownGlyph { glyph: other, row, col });
                    }
                }
                grid.set(GridPos::new(x, -1, z), Voxel::SOLID);
            }
        }

        if rows == 0 {
            return Err(WorldError::EmptyMap);
        }
        debug!(voxels = grid.len(), rows, "parsed ascii voxel map");
        Ok(grid)
    }

    /// Number of non-air cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    #[inline]
    pub fn set(&mut self, cell: GridPos, voxel: Voxel) {
        self.voxels.insert(cell, voxel);
    }

    #[inline]
    pub fn clear(&mut self, cell: GridPos) {
        self.voxels.remove(&cell);
    }

    #[inline]
    pub fn get(&self, cell: GridPos) -> Option<Voxel> {
        self.voxels.get(&cell).copied()
    }

    /// Fill a rectangle of solid floor at height `y` (inclusive bounds).
    pub fn fill_floor(&mut self, min: (i32, i32), max: (i32, i32), y: i32) {
        for x in min.0..=max.0 {
            for z in min.1..=max.1 {
                self.set(GridPos::new(x, y, z), Voxel::SOLID);
            }
        }
    }

    /// Stack `height` solid cells starting at `base_y`.
    pub fn add_column(&mut self, x: i32, z: i32, base_y: i32, height: i32) {
        for y in base_y..base_y + height {
            self.set(GridPos::new(x, y, z), Voxel::SOLID);
        }
    }

    /// Scatter `count` solid pillars of `height` over the rectangle
    /// `min..=max`, standing on `y = 0`.
    pub fn scatter_pillars(
        &mut self,
        rng:    &mut SimRng,
        min:    (i32, i32),
        max:    (i32, i32),
        count:  usize,
        height: i32,
    ) {
        for _ in 0..count {
            let x = rng.gen_range(min.0..=max.0);
            let z = rng.gen_range(min.1..=max.1);
            self.add_column(x, z, 0, height);
        }
    }

    #[inline]
    pub fn blocks_movement(&self, cell: GridPos) -> bool {
        self.voxels.get(&cell).is_some_and(|v| v.blocks_movement)
    }

    /// Can a two-cell-tall agent stand in `cell`?
    pub fn is_walkable(&self, cell: GridPos) -> bool {
        !self.blocks_movement(cell)
            && !self.blocks_movement(cell.above())
            && self.blocks_movement(cell.below())
    }

    /// Resolve a free-floating position to the cell an agent there would
    /// stand in: climb out of solid geometry, then drop onto the first
    /// movement-blocking cell below.
    pub fn supporting_cell(&self, position: Vec3) -> Option<GridPos> {
        let mut cell = GridPos::from_world(position);

        let mut climbed = 0;
        while self.blocks_movement(cell) {
            if climbed == MAX_SUPPORT_CLIMB {
                return None;
            }
            cell = cell.above();
            climbed += 1;
        }

        for _ in 0..MAX_SUPPORT_DROP {
            if self.blocks_movement(cell.below()) {
                return Some(cell);
            }
            cell = cell.below();
        }
        None
    }

    fn collides(&self, cell: GridPos, mask: CollisionMask) -> bool {
        self.voxels.get(&cell).is_some_and(|v| v.collides.intersects(mask))
    }
}

impl LineOfSight for VoxelGrid {
    fn raycast(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.magnitude();
        if length <= f32::EPSILON || mask.is_empty() {
            return None;
        }
        let dir = delta * (1.0 / length);

        let mut cell = GridPos::from_world(from);
        let axis = |d: f32, origin: f32, cell: i32| -> (i32, f32, f32) {
            if d > 0.0 {
                (1, (cell as f32 + 1.0 - origin) / d, 1.0 / d)
            } else if d < 0.0 {
                (-1, (cell as f32 - origin) / d, -1.0 / d)
            } else {
                (0, f32::INFINITY, f32::INFINITY)
            }
        };
        let (step_x, mut t_max_x, t_delta_x) = axis(dir.x, from.x, cell.x);
        let (step_y, mut t_max_y, t_delta_y) = axis(dir.y, from.y, cell.y);
        let (step_z, mut t_max_z, t_delta_z) = axis(dir.z, from.z, cell.z);

        loop {
            // Step into the neighbouring cell across the nearest boundary.
            let nearest = t_max_x.min(t_max_y).min(t_max_z);
            let (t, normal) = if t_max_x == nearest {
                let t = t_max_x;
                cell.x += step_x;
                t_max_x += t_delta_x;
                (t, Vec3::new(-step_x as f32, 0.0, 0.0))
            } else if t_max_y == nearest {
                let t = t_max_y;
                cell.y += step_y;
                t_max_y += t_delta_y;
                (t, Vec3::new(0.0, -step_y as f32, 0.0))
            } else {
                let t = t_max_z;
                cell.z += step_z;
                t_max_z += t_delta_z;
                (t, Vec3::new(0.0, 0.0, -step_z as f32))
            };

            if t > length {
                return None;
            }
            if self.collides(cell, mask) {
                return Some(RayHit {
                    point:    from + dir * t,
                    normal,
                    distance: t,
                });
            }
        }
    }
}
