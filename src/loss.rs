use ndarray::{Array1, ArrayView1};

/// Root mean squared error between a prediction and its target.
pub fn rmse(y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    (&y_pred - &y)
        .mapv(|x| x.powi(2))
        .mean()
        .unwrap_or_default()
        .sqrt()
}

/// `dE/dy` of the squared error `E = (y_pred - y)^2 / 2`.
pub fn squared_error_prime(y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
    &y_pred - &y
}
