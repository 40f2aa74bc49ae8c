use ndarray::{Array1, ArrayView1};

/// The logistic activation every non-input unit applies.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn f(x: f64) -> f64 {
        1. / (1. + (-x).exp())
    }

    /// The derivative expressed in terms of the activation's output `y`.
    pub fn df(y: f64) -> f64 {
        y * (1. - y)
    }

    pub fn forward(x: ArrayView1<f64>) -> Array1<f64> {
        x.mapv(Self::f)
    }

    /// Returns `dy/dx` for every output in `y`.
    pub fn backward(y: ArrayView1<f64>) -> Array1<f64> {
        y.mapv(Self::df)
    }
}
