use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used by the network engine.
pub type Result<T> = std::result::Result<T, NetErr>;

/// The network engine's error type.
#[derive(Debug)]
pub enum NetErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyLayer {
        layer: usize,
    },
    InvalidDistribution(String),
}

impl Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            NetErr::EmptyLayer { layer } => {
                write!(f, "Layer {layer} was declared with zero units")
            }
            NetErr::InvalidDistribution(msg) => {
                write!(f, "Invalid weight distribution: {msg}")
            }
        }
    }
}

impl Error for NetErr {}

impl From<rand_distr::NormalError> for NetErr {
    fn from(value: rand_distr::NormalError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

impl From<rand_distr::uniform::Error> for NetErr {
    fn from(value: rand_distr::uniform::Error) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}
