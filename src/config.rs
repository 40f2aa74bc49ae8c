use std::{error::Error, fmt, fs, io, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::training::{DEFAULT_LEARNING_RATE, EarlyStopping};

/// Errors produced while loading a training configuration.
#[derive(Debug)]
pub enum ConfigErr {
    Io(io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::Io(e) => write!(f, "io error: {e}"),
            ConfigErr::Json(e) => write!(f, "invalid JSON: {e}"),
            ConfigErr::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigErr::Io(e) => Some(e),
            ConfigErr::Json(e) => Some(e),
            ConfigErr::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Where the dataset lives and how its columns are laid out.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// The amount of feature columns, the target is the column right after them.
    pub x_size: usize,
    #[serde(default)]
    pub has_header: bool,
}

/// How the dataset is partitioned.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub validation: f64,
    pub test: f64,
    pub shuffle: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation: 0.15,
            test: 0.15,
            shuffle: true,
        }
    }
}

/// The normal distribution the initial weights are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            mean: 0.,
            std_dev: 1.,
        }
    }
}

/// A full training run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrainingConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default = "default_scale_features")]
    pub scale_features: bool,
    /// The width of every hidden layer, bottom to top. A single unit output layer always sits on
    /// top of them.
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub early_stopping: EarlyStopping,
    #[serde(default)]
    pub init: InitConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_scale_features() -> bool {
    true
}

fn default_hidden_layers() -> Vec<usize> {
    vec![2]
}

fn default_epochs() -> usize {
    5000
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn default_seed() -> u64 {
    1234
}

impl TrainingConfig {
    /// Loads and validates a `TrainingConfig` from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigErr> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a `TrainingConfig` from JSON.
    pub fn from_json(content: &str) -> Result<Self, ConfigErr> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the semantic constraints serde can't express.
    pub fn validate(&self) -> Result<(), ConfigErr> {
        let invalid = |msg: String| Err(ConfigErr::Invalid(msg));

        if self.dataset.x_size == 0 {
            return invalid("dataset.x_size must be greater than 0".into());
        }

        let SplitConfig {
            validation, test, ..
        } = self.split;
        for (name, fraction) in [("split.validation", validation), ("split.test", test)] {
            if !(fraction > 0. && fraction < 1.) {
                return invalid(format!("{name} must be in (0, 1), got {fraction}"));
            }
        }
        if validation + test >= 1. {
            return invalid(format!(
                "split.validation + split.test must be less than 1, got {}",
                validation + test
            ));
        }

        if let Some(i) = self.hidden_layers.iter().position(|&w| w == 0) {
            return invalid(format!("hidden layer {i} has no units"));
        }

        if self.epochs == 0 {
            return invalid("epochs must be greater than 0".into());
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(self.init.std_dev.is_finite() && self.init.std_dev >= 0.) {
            return invalid(format!(
                "init.std_dev must be non negative, got {}",
                self.init.std_dev
            ));
        }

        Ok(())
    }

    /// The width of every layer on top of the input one, output layer included.
    pub fn layer_widths(&self) -> Vec<usize> {
        let mut widths = self.hidden_layers.clone();
        widths.push(1);
        widths
    }
}
