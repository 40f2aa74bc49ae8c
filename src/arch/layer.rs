use ndarray::{Array1, Array2, ArrayView2, Axis, concatenate};

use super::{Split, Splits, Unit};
use crate::initialization::WeightGen;

/// A fixed-width collection of units fed by the same layer below.
///
/// Layers never own each other: `below` and `above` are positions in the owning network's layer
/// sequence.
#[derive(Clone, Debug)]
pub struct Layer {
    units: Vec<Unit>,
    below: Option<usize>,
    above: Option<usize>,

    // Forward metadata
    x_train: Array2<f64>,
}

impl Layer {
    /// Creates the input layer, whose units hold the columns of the given matrices.
    ///
    /// # Arguments
    /// * `inputs` - The training, validation and test inputs, one column per unit.
    pub fn input(inputs: &Splits<Array2<f64>>) -> Self {
        let num_neurons = inputs.train.ncols();
        let units = (0..num_neurons)
            .map(|idx| {
                let data = inputs.as_ref().map(|_, x| x.column(idx).to_owned());
                Unit::input(idx, data)
            })
            .collect();

        Self {
            units,
            below: None,
            above: None,
            x_train: Array2::zeros((0, 0)),
        }
    }

    /// Creates a new sigmoid layer on top of another one.
    ///
    /// # Arguments
    /// * `num_neurons` - The amount of units in this layer.
    /// * `below` - The position of the layer below in the network.
    /// * `inputs` - The width of the layer below.
    /// * `weight_gen` - The source of the initial weights, sampled once per unit.
    pub fn stacked<W>(num_neurons: usize, below: usize, inputs: usize, weight_gen: &mut W) -> Self
    where
        W: WeightGen + ?Sized,
    {
        let units = (0..num_neurons)
            .map(|idx| Unit::new(idx, weight_gen.sample(inputs + 1)))
            .collect();

        Self {
            units,
            below: Some(below),
            above: None,
            x_train: Array2::zeros((0, 0)),
        }
    }

    /// Returns the amount of units in this layer.
    pub fn num_neurons(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Returns the position of the layer below, `None` for the input layer.
    pub fn below(&self) -> Option<usize> {
        self.below
    }

    /// Returns the position of the layer above, `None` for the output layer.
    pub fn above(&self) -> Option<usize> {
        self.above
    }

    pub(super) fn set_above(&mut self, above: usize) {
        self.above = Some(above);
    }

    pub fn is_input(&self) -> bool {
        self.below.is_none()
    }

    /// Returns the weights of every unit as the rows of a matrix, empty for the input layer.
    pub fn weights(&self) -> Array2<f64> {
        let rows: Vec<_> = self.units.iter().filter_map(Unit::weights).collect();
        match rows.first() {
            Some(first) => {
                let mut w = Array2::zeros((rows.len(), first.len()));
                w.outer_iter_mut()
                    .zip(&rows)
                    .for_each(|(mut dst, src)| dst.assign(src));
                w
            }
            None => Array2::zeros((0, 0)),
        }
    }

    /// Recomputes every unit's output for the three splits with the current weights.
    ///
    /// # Arguments
    /// * `below` - The layer this one is stacked on.
    pub fn activate_layer(&mut self, below: &Layer) {
        if self.is_input() {
            return;
        }

        for split in Split::ALL {
            let x_in = with_bias(below.outputs(split).view());
            for unit in &mut self.units {
                unit.activate(split, x_in.view());
            }

            if split == Split::Train {
                self.x_train = x_in;
            }
        }
    }

    /// Returns the layer's output for `split`, one column per unit in unit order.
    pub fn outputs(&self, split: Split) -> Array2<f64> {
        let rows = self.units.first().map_or(0, |u| u.output(split).len());
        let mut y = Array2::zeros((rows, self.units.len()));
        y.axis_iter_mut(Axis(1))
            .zip(&self.units)
            .for_each(|(mut col, unit)| col.assign(&unit.output(split)));
        y
    }

    /// Returns the training output.
    pub fn output(&self) -> Array2<f64> {
        self.outputs(Split::Train)
    }

    /// Returns the validation output.
    pub fn validation(&self) -> Array2<f64> {
        self.outputs(Split::Validation)
    }

    /// Returns the test output.
    pub fn results(&self) -> Array2<f64> {
        self.outputs(Split::Test)
    }

    /// Updates every unit's weights and returns the error signal for the layer below.
    ///
    /// # Arguments
    /// * `d_out` - `dE/dy` for this layer's outputs, column `i` belongs to unit `i`. Any extra
    ///   trailing columns are ignored.
    /// * `learning_rate` - The length of the gradient descent step.
    ///
    /// # Returns
    /// The sum of the units' `dE/dy_in`, one column per unit below plus a trailing bias column.
    pub fn back_propagate(&mut self, d_out: ArrayView2<f64>, learning_rate: f64) -> Array2<f64> {
        let x_train = self.x_train.view();
        for unit in &mut self.units {
            let d = d_out.column(unit.idx());
            unit.compute_gradients(d, x_train, learning_rate);
        }

        let mut d_in = Array2::zeros(x_train.dim());
        for unit in &self.units {
            d_in += &unit.d_in();
        }

        d_in
    }
}

/// Appends a column of ones to `x`.
fn with_bias(x: ArrayView2<f64>) -> Array2<f64> {
    let ones = Array1::ones(x.nrows()).insert_axis(Axis(1));
    concatenate![Axis(1), x, ones]
}
