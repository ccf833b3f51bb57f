//! Deterministic simulation-level RNG wrapper.
//!
//! Nothing in the cover core itself is random: searches are deterministic
//! given the world and the table.  `SimRng` exists for the callers that
//! build worlds and scenarios (reference voxel worlds, demo skirmishes) so
//! those are reproducible from a single seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG for world generation and scenario setup.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
