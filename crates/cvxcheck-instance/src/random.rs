use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Seeded pseudo-random source threaded through instance generation.
///
/// Matrices are filled in row-major order so that a given seed always
/// produces the same coefficient data regardless of the matrix layout.
pub struct RandomSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        RandomSource {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy; the drawn seed is kept so the run can be replayed
    pub fn from_entropy() -> Self {
        let seed = rand::thread_rng().gen::<u64>();
        tracing::info!(seed, "no seed configured, drew one from entropy");
        Self::from_seed(seed)
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Uniform draw in [-1, 1]
    pub fn symmetric_uniform(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }

    pub fn normal_matrix(&mut self, rows: usize, cols: usize) -> DMatrix<f64> {
        let data: Vec<f64> = (0..rows * cols).map(|_| self.standard_normal()).collect();
        DMatrix::from_row_slice(rows, cols, &data)
    }

    pub fn normal_vector(&mut self, len: usize) -> DVector<f64> {
        DVector::from_iterator(len, (0..len).map(|_| self.standard_normal()))
    }

    pub fn uniform_matrix(&mut self, rows: usize, cols: usize) -> DMatrix<f64> {
        let data: Vec<f64> = (0..rows * cols).map(|_| self.symmetric_uniform()).collect();
        DMatrix::from_row_slice(rows, cols, &data)
    }

    pub fn uniform_vector(&mut self, len: usize) -> DVector<f64> {
        DVector::from_iterator(len, (0..len).map(|_| self.symmetric_uniform()))
    }
}
