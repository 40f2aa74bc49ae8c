use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::{Layer, NetworkBuilder, Split, Splits};
use crate::{
    NetErr, Result,
    loss::{rmse, squared_error_prime},
    training::{EarlyStopping, LearnReport, TrainingState},
};

/// A stack of fully connected sigmoid layers trained by full-batch gradient descent.
///
/// The first layer is the input layer, the last one the output layer, which must have a single
/// unit. Every epoch is recorded in three error histories, one per split.
#[derive(Clone, Debug)]
pub struct Network {
    layers: Vec<Layer>,
    history: Splits<Vec<f64>>,
    learning_rate: f64,
    early_stopping: EarlyStopping,
    state: TrainingState,
}

impl Network {
    /// Starts building a network on top of the given input data.
    pub fn builder(inputs: Splits<Array2<f64>>) -> NetworkBuilder {
        NetworkBuilder::new(inputs)
    }

    pub(super) fn new(
        layers: Vec<Layer>,
        learning_rate: f64,
        early_stopping: EarlyStopping,
    ) -> Self {
        Self {
            layers,
            history: Splits::default(),
            learning_rate,
            early_stopping,
            state: TrainingState::default(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// The per epoch RMSE of every split.
    pub fn history(&self) -> &Splits<Vec<f64>> {
        &self.history
    }

    /// The per epoch training RMSE.
    pub fn errors(&self) -> &[f64] {
        &self.history.train
    }

    /// The per epoch validation RMSE.
    pub fn validation_errors(&self) -> &[f64] {
        &self.history.validation
    }

    /// The per epoch test RMSE.
    pub fn test_errors(&self) -> &[f64] {
        &self.history.test
    }

    /// The output layer's prediction for `split` as of the last forward pass.
    pub fn predict(&self, split: Split) -> Array1<f64> {
        self.output_layer().outputs(split).column(0).to_owned()
    }

    /// Trains the network for up to `num_epochs` epochs.
    ///
    /// Before every epoch the early stopping rule is checked against the validation history, once
    /// it fires the network is stopped for good and the remaining epochs are skipped.
    ///
    /// # Arguments
    /// * `num_epochs` - The maximum amount of epochs to run.
    /// * `y_train` - The training targets, one per training row.
    /// * `y_validate` - The validation targets, one per validation row.
    /// * `y_test` - The test targets, one per test row.
    ///
    /// # Returns
    /// A report of the call, or an error if the targets don't line up with the inputs.
    pub fn learn(
        &mut self,
        num_epochs: usize,
        y_train: ArrayView1<f64>,
        y_validate: ArrayView1<f64>,
        y_test: ArrayView1<f64>,
    ) -> Result<LearnReport> {
        let targets = Splits::new(y_train, y_validate, y_test);
        self.check_targets(&targets)?;

        info!(
            "learning for up to {num_epochs} epochs, learning_rate={}",
            self.learning_rate
        );

        let mut epochs = 0;
        for _ in 0..num_epochs {
            if !self.should_continue() {
                break;
            }

            self.epoch(&targets);
            epochs += 1;
        }

        if let Some(err) = self.history.train.last() {
            info!("learned {epochs} epochs, train rmse {err}");
        }

        Ok(LearnReport {
            epochs,
            state: self.state,
        })
    }

    /// Evaluates the early stopping rule, moving the network to `Stopped` if it fires.
    fn should_continue(&mut self) -> bool {
        if let TrainingState::Stopped { .. } = self.state {
            return false;
        }

        if self.early_stopping.should_stop(&self.history.validation) {
            let epoch = self.history.validation.len();
            info!(
                "validation error hasn't improved over the last {} epochs, stopping at epoch {epoch}",
                self.early_stopping.window()
            );
            self.state = TrainingState::Stopped { epoch };
            return false;
        }

        true
    }

    fn epoch(&mut self, targets: &Splits<ArrayView1<f64>>) {
        self.forward();

        let y_pred = self.predict(Split::Train);
        let d_out = squared_error_prime(y_pred.view(), targets.train).insert_axis(Axis(1));
        self.backward(d_out);

        for (split, y) in targets.iter() {
            let err = rmse(self.predict(split).view(), *y);
            self.history[split].push(err);
        }

        debug!(
            epoch = self.history.train.len(),
            train = self.history.train.last().copied().unwrap_or_default(),
            validation = self.history.validation.last().copied().unwrap_or_default(),
            test = self.history.test.last().copied().unwrap_or_default();
            "epoch done"
        );
    }

    /// Activates every layer but the input one, bottom to top.
    fn forward(&mut self) {
        for i in 1..self.layers.len() {
            let (lower, upper) = self.layers.split_at_mut(i);
            let layer = &mut upper[0];
            if let Some(below) = layer.below() {
                layer.activate_layer(&lower[below]);
            }
        }
    }

    /// Propagates the output error signal down to the input layer, updating weights on the way.
    fn backward(&mut self, mut d: Array2<f64>) {
        let lr = self.learning_rate;
        for layer in self.layers[1..].iter_mut().rev() {
            d = layer.back_propagate(d.view(), lr);
        }
    }

    fn output_layer(&self) -> &Layer {
        // SAFETY: the builder never produces a network without layers.
        self.layers.last().unwrap()
    }

    fn check_targets(&self, targets: &Splits<ArrayView1<f64>>) -> Result<()> {
        let outputs = self.output_layer().num_neurons();
        if outputs != 1 {
            return Err(NetErr::SizeMismatch {
                a: "output layer",
                b: "targets",
                got: outputs,
                expected: 1,
            });
        }

        let input = &self.layers[0];
        for (split, y) in targets.iter() {
            let rows = input.outputs(split).nrows();
            if y.len() != rows {
                return Err(NetErr::SizeMismatch {
                    a: target_name(split),
                    b: "inputs",
                    got: y.len(),
                    expected: rows,
                });
            }
        }

        Ok(())
    }
}

fn target_name(split: Split) -> &'static str {
    match split {
        Split::Train => "training targets",
        Split::Validation => "validation targets",
        Split::Test => "test targets",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arch::Sigmoid, initialization::RandWeightGen};
    use ndarray::{array, concatenate};

    fn xor() -> (Splits<Array2<f64>>, Array1<f64>) {
        let x = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
        let inputs = Splits::new(x.clone(), x.clone(), x);
        (inputs, array![0., 1., 1., 0.])
    }

    fn xor_net(seed: u64) -> Network {
        let (inputs, _) = xor();
        let mut weight_gen = RandWeightGen::seeded(seed);
        Network::builder(inputs)
            .layer(2)
            .layer(1)
            .build(&mut weight_gen)
            .unwrap()
    }

    #[test]
    fn one_history_entry_per_epoch() {
        let (_, y) = xor();
        let mut net = xor_net(1234);

        let report = net.learn(10, y.view(), y.view(), y.view()).unwrap();

        assert_eq!(report.epochs, 10);
        assert_eq!(report.state, TrainingState::Training);
        assert_eq!(net.errors().len(), 10);
        assert_eq!(net.validation_errors().len(), 10);
        assert_eq!(net.test_errors().len(), 10);
    }

    #[test]
    fn identical_splits_have_identical_errors() {
        let (_, y) = xor();
        let mut net = xor_net(1234);
        net.learn(5, y.view(), y.view(), y.view()).unwrap();

        assert_eq!(net.errors(), net.validation_errors());
        assert_eq!(net.errors(), net.test_errors());
    }

    #[test]
    fn recorded_error_matches_the_forward_pass() {
        let (inputs, y) = xor();
        let mut net = xor_net(1234);

        let hidden = net.layers()[1].weights();
        let output = net.layers()[2].weights();
        let with_bias =
            |x: &Array2<f64>| concatenate![Axis(1), x.view(), Array2::ones((x.nrows(), 1))];
        let h = with_bias(&inputs.train).dot(&hidden.t()).mapv(Sigmoid::f);
        let y_pred = with_bias(&h).dot(&output.t()).mapv(Sigmoid::f);
        let expected = rmse(y_pred.column(0), y.view());

        net.learn(1, y.view(), y.view(), y.view()).unwrap();

        assert!((net.errors()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn rejects_misaligned_targets() {
        let (_, y) = xor();
        let mut net = xor_net(1234);
        let short = array![0., 1.];

        let err = net.learn(1, y.view(), short.view(), y.view()).unwrap_err();
        assert!(matches!(
            err,
            NetErr::SizeMismatch {
                a: "validation targets",
                got: 2,
                expected: 4,
                ..
            }
        ));
        assert!(net.errors().is_empty());
    }

    #[test]
    fn rejects_multiple_output_units() {
        let (inputs, y) = xor();
        let mut weight_gen = RandWeightGen::seeded(1234);
        let mut net = Network::builder(inputs)
            .layer(2)
            .build(&mut weight_gen)
            .unwrap();

        let err = net.learn(1, y.view(), y.view(), y.view()).unwrap_err();
        assert!(matches!(err, NetErr::SizeMismatch { a: "output layer", got: 2, .. }));
    }

    #[test]
    fn stopped_network_stays_stopped() {
        let (inputs, y) = xor();
        let mut weight_gen = RandWeightGen::seeded(1234);
        // frozen weights give a flat validation history
        let mut net = Network::builder(inputs)
            .layer(2)
            .layer(1)
            .learning_rate(0.)
            .early_stopping(EarlyStopping::new(3))
            .build(&mut weight_gen)
            .unwrap();

        let report = net.learn(1000, y.view(), y.view(), y.view()).unwrap();

        assert!(report.stopped_early());
        assert_eq!(report.epochs, 4);
        assert_eq!(net.state(), TrainingState::Stopped { epoch: 4 });
        assert_eq!(net.validation_errors().len(), 4);

        let again = net.learn(10, y.view(), y.view(), y.view()).unwrap();
        assert_eq!(again.epochs, 0);
        assert_eq!(net.validation_errors().len(), 4);
    }

    #[test]
    fn learning_continues_across_calls() {
        let (_, y) = xor();
        let mut split_run = xor_net(5);
        split_run.learn(3, y.view(), y.view(), y.view()).unwrap();
        split_run.learn(4, y.view(), y.view(), y.view()).unwrap();

        let mut single_run = xor_net(5);
        single_run.learn(7, y.view(), y.view(), y.view()).unwrap();

        assert_eq!(split_run.history(), single_run.history());
    }
}
