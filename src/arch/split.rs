use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the three data partitions processed in parallel through the same weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    /// Every split, in the order the network processes them.
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];
}

/// A value held once per split.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Splits<T> {
    pub train: T,
    pub validation: T,
    pub test: T,
}

impl<T> Splits<T> {
    /// Creates a new `Splits`.
    ///
    /// # Arguments
    /// * `train` - The training value.
    /// * `validation` - The validation value.
    /// * `test` - The test value.
    pub fn new(train: T, validation: T, test: T) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Builds a `Splits` by calling `f` once per split.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Split) -> T,
    {
        Self {
            train: f(Split::Train),
            validation: f(Split::Validation),
            test: f(Split::Test),
        }
    }

    /// Maps every value, keeping track of which split it belongs to.
    pub fn map<U, F>(self, mut f: F) -> Splits<U>
    where
        F: FnMut(Split, T) -> U,
    {
        Splits {
            train: f(Split::Train, self.train),
            validation: f(Split::Validation, self.validation),
            test: f(Split::Test, self.test),
        }
    }

    /// Borrows every value.
    pub fn as_ref(&self) -> Splits<&T> {
        Splits {
            train: &self.train,
            validation: &self.validation,
            test: &self.test,
        }
    }

    /// Iterates over `(split, value)` pairs in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &T)> {
        Split::ALL.into_iter().map(move |split| (split, &self[split]))
    }
}

impl<T> Index<Split> for Splits<T> {
    type Output = T;

    fn index(&self, split: Split) -> &T {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }
}

impl<T> IndexMut<Split> for Splits<T> {
    fn index_mut(&mut self, split: Split) -> &mut T {
        match split {
            Split::Train => &mut self.train,
            Split::Validation => &mut self.validation,
            Split::Test => &mut self.test,
        }
    }
}
