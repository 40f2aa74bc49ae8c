use log::info;
use ndarray::Array2;

use super::{Layer, Network, Splits};
use crate::{
    NetErr, Result,
    initialization::WeightGen,
    training::{DEFAULT_LEARNING_RATE, EarlyStopping},
};

/// Builds a `Network` layer by layer, starting from the input data.
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    inputs: Splits<Array2<f64>>,
    widths: Vec<usize>,
    learning_rate: f64,
    early_stopping: EarlyStopping,
}

impl NetworkBuilder {
    /// Creates a new `NetworkBuilder`.
    ///
    /// # Arguments
    /// * `inputs` - The training, validation and test inputs, which become the fixed output of the
    ///   input layer.
    pub fn new(inputs: Splits<Array2<f64>>) -> Self {
        Self {
            inputs,
            widths: Vec::new(),
            learning_rate: DEFAULT_LEARNING_RATE,
            early_stopping: EarlyStopping::default(),
        }
    }

    /// Stacks a new sigmoid layer of `num_neurons` units on top of the last one.
    pub fn layer(mut self, num_neurons: usize) -> Self {
        self.widths.push(num_neurons);
        self
    }

    /// Stacks several layers, bottom to top.
    pub fn layers<I>(mut self, widths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.widths.extend(widths);
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn early_stopping(mut self, early_stopping: EarlyStopping) -> Self {
        self.early_stopping = early_stopping;
        self
    }

    /// Builds the network, sampling every unit's weights from `weight_gen` bottom layer first.
    ///
    /// # Returns
    /// An error if the inputs disagree on their width, a layer has no units or there is no layer
    /// on top of the input one.
    pub fn build<W>(self, weight_gen: &mut W) -> Result<Network>
    where
        W: WeightGen + ?Sized,
    {
        let Self {
            inputs,
            widths,
            learning_rate,
            early_stopping,
        } = self;

        let width = inputs.train.ncols();
        if width == 0 {
            return Err(NetErr::EmptyLayer { layer: 0 });
        }

        for (name, x) in [("validation inputs", &inputs.validation), ("test inputs", &inputs.test)] {
            if x.ncols() != width {
                return Err(NetErr::SizeMismatch {
                    a: name,
                    b: "training inputs",
                    got: x.ncols(),
                    expected: width,
                });
            }
        }

        if widths.is_empty() {
            return Err(NetErr::SizeMismatch {
                a: "network",
                b: "layers",
                got: 1,
                expected: 2,
            });
        }

        if let Some(i) = widths.iter().position(|&w| w == 0) {
            return Err(NetErr::EmptyLayer { layer: i + 1 });
        }

        let mut layers = Vec::with_capacity(widths.len() + 1);
        layers.push(Layer::input(&inputs));

        for num_neurons in widths {
            let below = layers.len() - 1;
            let below_width = layers[below].num_neurons();
            layers.push(Layer::stacked(num_neurons, below, below_width, weight_gen));
            layers[below].set_above(below + 1);
        }

        let topology: Vec<_> = layers.iter().map(Layer::num_neurons).collect();
        info!("built network with topology {topology:?}, learning_rate={learning_rate}");

        Ok(Network::new(layers, learning_rate, early_stopping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::RandWeightGen;
    use ndarray::array;

    fn inputs() -> Splits<Array2<f64>> {
        Splits::new(
            array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]],
            array![[0., 1.]],
            array![[1., 1.]],
        )
    }

    #[test]
    fn links_layers_both_ways() {
        let mut weight_gen = RandWeightGen::seeded(1234);
        let net = NetworkBuilder::new(inputs())
            .layers([3, 2])
            .layer(1)
            .build(&mut weight_gen)
            .unwrap();

        let layers = net.layers();
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].below(), None);
        for i in 1..4 {
            assert_eq!(layers[i].below(), Some(i - 1));
            assert_eq!(layers[i - 1].above(), Some(i));
        }
        assert_eq!(layers[3].above(), None);

        let widths: Vec<_> = layers.iter().map(Layer::num_neurons).collect();
        assert_eq!(widths, [2, 3, 2, 1]);
        assert_eq!(layers[1].weights().dim(), (3, 3));
        assert_eq!(layers[2].weights().dim(), (2, 4));
        assert_eq!(layers[3].weights().dim(), (1, 3));
    }

    #[test]
    fn units_start_from_different_weights() {
        let mut weight_gen = RandWeightGen::seeded(1234);
        let net = NetworkBuilder::new(inputs())
            .layer(2)
            .layer(1)
            .build(&mut weight_gen)
            .unwrap();

        let w = net.layers()[1].weights();
        assert_ne!(w.row(0), w.row(1));
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let mut weight_gen = RandWeightGen::seeded(1234);
        let mut bad = inputs();
        bad.test = array![[1., 1., 1.]];

        let err = NetworkBuilder::new(bad)
            .layer(1)
            .build(&mut weight_gen)
            .unwrap_err();

        assert!(matches!(
            err,
            NetErr::SizeMismatch {
                a: "test inputs",
                got: 3,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_layers() {
        let mut weight_gen = RandWeightGen::seeded(1234);

        let err = NetworkBuilder::new(inputs())
            .layers([2, 0, 1])
            .build(&mut weight_gen)
            .unwrap_err();
        assert!(matches!(err, NetErr::EmptyLayer { layer: 2 }));

        let empty = Splits::new(
            Array2::zeros((4, 0)),
            Array2::zeros((1, 0)),
            Array2::zeros((1, 0)),
        );
        let err = NetworkBuilder::new(empty)
            .layer(1)
            .build(&mut weight_gen)
            .unwrap_err();
        assert!(matches!(err, NetErr::EmptyLayer { layer: 0 }));
    }

    #[test]
    fn rejects_input_only_network() {
        let mut weight_gen = RandWeightGen::seeded(1234);
        let err = NetworkBuilder::new(inputs())
            .build(&mut weight_gen)
            .unwrap_err();

        assert!(matches!(err, NetErr::SizeMismatch { a: "network", .. }));
    }
}
