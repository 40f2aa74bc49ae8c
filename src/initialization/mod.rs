mod random;

pub use random::RandWeightGen;

use ndarray::Array1;

/// A source of initial weights.
///
/// Units draw from the same generator in construction order, so a given generator state always
/// yields the same network.
pub trait WeightGen {
    /// Returns the next `n` weights.
    fn sample(&mut self, n: usize) -> Array1<f64>;
}
