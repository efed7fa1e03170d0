use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Axis-aligned rectangle on the ground plane (XZ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl SpawnRect {
    /// Square centred on the arena origin.
    pub fn centered(half_extent: f64) -> Self {
        Self {
            min_x: -half_extent,
            max_x: half_extent,
            min_z: -half_extent,
            max_z: half_extent,
        }
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Uniform sampling capability injected into spawn and AI logic.
pub trait Sampler {
    /// Uniform sample in `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    fn point_in(&mut self, rect: &SpawnRect) -> (f64, f64) {
        let x = self.uniform(rect.min_x, rect.max_x);
        let z = self.uniform(rect.min_z, rect.max_z);
        (x, z)
    }
}

/// Deterministic sampler backed by ChaCha8.
pub struct SeededSampler {
    rng: ChaCha8Rng,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Sampler for SeededSampler {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if lo >= hi || lo.is_nan() || hi.is_nan() {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }
}
