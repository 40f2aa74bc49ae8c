use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::{Sigmoid, Split, Splits};

/// A single sigmoid node.
///
/// Holds its weight vector (the last weight is the bias) and the activation it produced for each
/// split on the last forward pass. Units of the input layer have no weights, their caches are the
/// columns of the input data.
#[derive(Clone, Debug)]
pub struct Unit {
    idx: usize,
    weights: Option<Array1<f64>>,
    outputs: Splits<Array1<f64>>,

    // Backward metadata
    d_in: Array2<f64>,
}

impl Unit {
    /// Creates a new input `Unit` whose caches never change.
    ///
    /// # Arguments
    /// * `idx` - The position of the unit in its layer.
    /// * `data` - The unit's fixed column for each split.
    pub fn input(idx: usize, data: Splits<Array1<f64>>) -> Self {
        Self {
            idx,
            weights: None,
            outputs: data,
            d_in: Array2::zeros((0, 0)),
        }
    }

    /// Creates a new sigmoid `Unit`.
    ///
    /// # Arguments
    /// * `idx` - The position of the unit in its layer.
    /// * `weights` - The initial weights, one per unit below plus the bias weight.
    pub fn new(idx: usize, weights: Array1<f64>) -> Self {
        Self {
            idx,
            weights: Some(weights),
            outputs: Splits::default(),
            d_in: Array2::zeros((0, 0)),
        }
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    /// The unit's weights, `None` for input units.
    pub fn weights(&self) -> Option<ArrayView1<'_, f64>> {
        self.weights.as_ref().map(|w| w.view())
    }

    /// The activation cached for `split`.
    pub fn output(&self, split: Split) -> ArrayView1<'_, f64> {
        self.outputs[split].view()
    }

    /// The error signal computed for the layer below on the last backward pass.
    pub fn d_in(&self) -> ArrayView2<'_, f64> {
        self.d_in.view()
    }

    /// Computes `y = sigmoid(x_in · w)` and stores it as the cache for `split`.
    ///
    /// # Arguments
    /// * `split` - The split being activated.
    /// * `x_in` - The output of the layer below for `split`, with a trailing column of ones.
    pub fn activate(&mut self, split: Split, x_in: ArrayView2<f64>) {
        let Some(w) = &self.weights else {
            return;
        };

        let x = x_in.dot(w);
        self.outputs[split] = x.mapv_into(Sigmoid::f);
    }

    /// Takes a gradient descent step on the training split and caches the error signal for the
    /// layer below.
    ///
    /// # Arguments
    /// * `d_out` - `dE/dy` for this unit's output, one value per training row.
    /// * `x_in` - The bias augmented input of the last training activation.
    /// * `learning_rate` - The length of the step.
    pub fn compute_gradients(
        &mut self,
        d_out: ArrayView1<f64>,
        x_in: ArrayView2<f64>,
        learning_rate: f64,
    ) {
        let Some(w) = &mut self.weights else {
            return;
        };

        let dy_dx = Sigmoid::backward(self.outputs.train.view());
        let delta = &d_out * &dy_dx;
        let delta_col = delta.view().insert_axis(Axis(1));

        // mean over rows of delta * x_in
        let dw = x_in.t().dot(&delta) / x_in.nrows() as f64;

        // uses the weights from before this step
        self.d_in = &delta_col * &w.view().insert_axis(Axis(0));

        w.scaled_add(-learning_rate, &dw);
    }
}
