use ndarray::Array1;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};

use super::WeightGen;
use crate::Result;

/// A weight generator that follows a certain probabilistic distribution.
pub struct RandWeightGen<R: Rng, D: Distribution<f64>> {
    rng: R,
    distribution: D,
}

impl<R: Rng, D: Distribution<f64>> RandWeightGen<R, D> {
    /// Creates a new `RandWeightGen` weight generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    pub fn new(rng: R, distribution: D) -> Self {
        Self { rng, distribution }
    }
}

impl<R: Rng> RandWeightGen<R, Normal<f64>> {
    /// Creates a new `RandWeightGen` weight generator with a normal distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `mean` - The mean of the distribution.
    /// * `std_dev` - The standard deviation of the distribution.
    ///
    /// # Returns
    /// An error if `std_dev` is not finite (Nan or infinite).
    pub fn normal(rng: R, mean: f64, std_dev: f64) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?))
    }
}

impl RandWeightGen<StdRng, Normal<f64>> {
    /// Creates the standard normal generator the network is initialized with by default.
    ///
    /// # Arguments
    /// * `seed` - The seed for the underlying `StdRng`.
    pub fn seeded(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        // SAFETY: a unit standard deviation is always valid.
        Self::normal(rng, 0., 1.).unwrap()
    }
}

impl<R: Rng> RandWeightGen<R, Uniform<f64>> {
    /// Creates a new `RandWeightGen` weight generator with a uniform distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `low` - The inclusive lower limit.
    /// * `high` - The exclusive upper limit.
    ///
    /// # Returns
    /// An error if the range is invalid (low > high).
    pub fn uniform(rng: R, low: f64, high: f64) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?))
    }
}

impl<R: Rng, D: Distribution<f64>> WeightGen for RandWeightGen<R, D> {
    fn sample(&mut self, n: usize) -> Array1<f64> {
        let rng = &mut self.rng;
        Array1::from_iter((0..n).map(|_| self.distribution.sample(rng)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty() {
        let mut weight_gen = RandWeightGen::normal(seeded_rng(), 0., 1.).unwrap();
        assert!(weight_gen.sample(0).is_empty());
    }

    #[test]
    fn same_seed_same_weights() {
        let mut a = RandWeightGen::seeded(1234);
        let mut b = RandWeightGen::seeded(1234);

        assert_eq!(a.sample(7), b.sample(7));
        assert_eq!(a.sample(3), b.sample(3));
    }

    #[test]
    fn consecutive_samples_differ() {
        let mut weight_gen = RandWeightGen::seeded(1234);
        assert_ne!(weight_gen.sample(3), weight_gen.sample(3));
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut weight_gen = RandWeightGen::uniform(seeded_rng(), -0.5, 0.5).unwrap();
        let sample = weight_gen.sample(100);

        assert_eq!(sample.len(), 100);
        assert!(sample.iter().all(|w| (-0.5..0.5).contains(w)));
    }

    #[test]
    fn invalid_parameters() {
        assert!(RandWeightGen::normal(seeded_rng(), 0., f64::NAN).is_err());
        assert!(RandWeightGen::uniform(seeded_rng(), 1., -1.).is_err());
    }
}
