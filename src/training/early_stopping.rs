use serde::Deserialize;

/// The default amount of trailing epochs inspected by [`EarlyStopping`].
pub const DEFAULT_WINDOW: usize = 50;

/// Validation based early stopping.
///
/// Training stops once the validation error has failed to drop below the value it had `window`
/// epochs ago for every one of the last `window` epochs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EarlyStopping {
    window: usize,
}

impl Default for EarlyStopping {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl EarlyStopping {
    /// Creates a new `EarlyStopping`.
    ///
    /// # Arguments
    /// * `window` - The amount of trailing epochs to inspect.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Decides whether training should stop given the validation error history so far.
    ///
    /// Never stops while the history holds `window` entries or less. A single entry in the
    /// window that dips below the window's first entry cancels the stop.
    pub fn should_stop(&self, val_errors: &[f64]) -> bool {
        if val_errors.len() <= self.window {
            return false;
        }

        let window = &val_errors[val_errors.len() - self.window..];
        let Some((first, rest)) = window.split_first() else {
            return false;
        };

        rest.iter().all(|e| e >= first)
    }
}
