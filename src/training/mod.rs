mod early_stopping;

pub use early_stopping::{DEFAULT_WINDOW, EarlyStopping};

use serde::Serialize;

/// The learning rate used when none is configured.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Where a network is in its training run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TrainingState {
    #[default]
    Training,
    /// Early stopping fired before running `epoch` (counted over the whole run). Terminal.
    Stopped { epoch: usize },
}

/// What a call to `Network::learn` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LearnReport {
    /// The amount of epochs that updated the weights during this call.
    pub epochs: usize,
    /// The state the network was left in.
    pub state: TrainingState,
}

impl LearnReport {
    pub fn stopped_early(&self) -> bool {
        matches!(self.state, TrainingState::Stopped { .. })
    }
}
