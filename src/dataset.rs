use std::{error::Error, fmt, fs, io, path::Path};

use log::debug;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::arch::{Split, Splits};

/// Errors produced while loading or partitioning a dataset.
#[derive(Debug)]
pub enum DataErr {
    Io(io::Error),
    /// A value on a line could not be parsed as a number.
    Parse { line: usize, value: String },
    /// A line has the wrong amount of values.
    RowLength {
        line: usize,
        got: usize,
        expected: usize,
    },
    /// The features and targets disagree on the amount of rows.
    RowCount { x: usize, y: usize },
    Empty,
    /// The fractions would leave a split without rows.
    InvalidFractions {
        rows: usize,
        validation: f64,
        test: f64,
    },
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Io(e) => write!(f, "io error: {e}"),
            DataErr::Parse { line, value } => {
                write!(f, "dataset line {line}: cannot parse '{value}' as a number")
            }
            DataErr::RowLength {
                line,
                got,
                expected,
            } => write!(
                f,
                "dataset line {line}: expected {expected} values, got {got}"
            ),
            DataErr::RowCount { x, y } => {
                write!(f, "features have {x} rows but targets have {y}")
            }
            DataErr::Empty => write!(f, "dataset is empty"),
            DataErr::InvalidFractions {
                rows,
                validation,
                test,
            } => write!(
                f,
                "cannot split {rows} rows into validation={validation} and test={test} leaving every split non empty"
            ),
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Features and a single real valued target per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Returns
    /// An error if `x` and `y` have a different amount of rows.
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, DataErr> {
        if x.nrows() != y.len() {
            return Err(DataErr::RowCount {
                x: x.nrows(),
                y: y.len(),
            });
        }

        Ok(Self { x, y })
    }

    /// Reads a CSV file whose rows are `x_size` features followed by the target.
    ///
    /// # Arguments
    /// * `path` - The path of the file.
    /// * `x_size` - The amount of feature columns.
    /// * `has_header` - Whether the first non empty line holds column names.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        x_size: usize,
        has_header: bool,
    ) -> Result<Self, DataErr> {
        let content = fs::read_to_string(path)?;
        Self::parse_csv(&content, x_size, has_header)
    }

    /// Parses CSV content whose rows are `x_size` features followed by the target.
    ///
    /// Blank lines are skipped. Line numbers in errors start at 1.
    pub fn parse_csv(content: &str, x_size: usize, has_header: bool) -> Result<Self, DataErr> {
        let row_size = x_size + 1;
        let mut data = Vec::new();
        let mut skip_header = has_header;

        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if skip_header {
                debug!("skipping header: {line}");
                skip_header = false;
                continue;
            }

            let values = line
                .split(',')
                .map(|v| {
                    let v = v.trim();
                    v.parse::<f64>().map_err(|_| DataErr::Parse {
                        line: i + 1,
                        value: v.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if values.len() != row_size {
                return Err(DataErr::RowLength {
                    line: i + 1,
                    got: values.len(),
                    expected: row_size,
                });
            }

            data.extend(values);
        }

        if data.is_empty() {
            return Err(DataErr::Empty);
        }

        let rows = data.len() / row_size;
        // SAFETY: every row pushed exactly `row_size` values.
        let full = Array2::from_shape_vec((rows, row_size), data).unwrap();
        let (x, y) = full.view().split_at(Axis(1), x_size);

        Ok(Self {
            x: x.to_owned(),
            y: y.column(0).to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Partitions the rows into training, validation and test sets.
    ///
    /// The validation and test sets get `fraction * len` rows each (rounded), the training set
    /// gets the rest.
    ///
    /// # Arguments
    /// * `validation` - The fraction of rows for the validation set.
    /// * `test` - The fraction of rows for the test set.
    /// * `shuffle` - Whether to shuffle the rows before partitioning.
    /// * `rng` - A random number generator, only used when shuffling.
    ///
    /// # Returns
    /// An error if any of the three sets would end up empty.
    pub fn split<R: Rng + ?Sized>(
        &self,
        validation: f64,
        test: f64,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Splits<Dataset>, DataErr> {
        let rows = self.len();
        let n_validation = (rows as f64 * validation).round() as usize;
        let n_test = (rows as f64 * test).round() as usize;

        if n_validation == 0 || n_test == 0 || n_validation + n_test >= rows {
            return Err(DataErr::InvalidFractions {
                rows,
                validation,
                test,
            });
        }

        let mut indices: Vec<usize> = (0..rows).collect();
        if shuffle {
            indices.shuffle(rng);
        }

        let n_train = rows - n_validation - n_test;
        let (train_rows, rest) = indices.split_at(n_train);
        let (validation_rows, test_rows) = rest.split_at(n_validation);

        Ok(Splits::new(
            self.select(train_rows),
            self.select(validation_rows),
            self.select(test_rows),
        ))
    }

    fn select(&self, rows: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), rows),
            y: self.y.select(Axis(0), rows),
        }
    }
}

/// Rescales every feature into `[0, 1]` using the range seen on the data it was fitted on.
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    /// Fits the scaler on the columns of `x`.
    pub fn fit(x: ArrayView2<f64>) -> Self {
        let min = x.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
        // constant columns map to 0
        let range = (&max - &min).mapv(|r| if r > 0. { r } else { 1. });

        Self { min, range }
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        (&x - &self.min) / &self.range
    }

    /// Fits on the training features and rescales the three sets with that fit.
    pub fn fit_splits(splits: &mut Splits<Dataset>) -> Self {
        let scaler = Self::fit(splits.train.x.view());
        for split in Split::ALL {
            let data = &mut splits[split];
            data.x = scaler.transform(data.x.view());
        }

        scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    const CSV: &str = "a,b,winner\n\n1,2,0\n3, 4 ,1\n\n5,6,1\n";

    #[test]
    fn parses_rows_after_the_header() {
        let dataset = Dataset::parse_csv(CSV, 2, true).unwrap();

        assert_eq!(dataset.x(), &array![[1., 2.], [3., 4.], [5., 6.]]);
        assert_eq!(dataset.y(), &array![0., 1., 1.]);
    }

    #[test]
    fn header_is_a_parse_error_when_not_expected() {
        let err = Dataset::parse_csv(CSV, 2, false).unwrap_err();
        assert!(matches!(err, DataErr::Parse { line: 1, ref value } if value == "a"));
    }

    #[test]
    fn rejects_short_rows() {
        let err = Dataset::parse_csv("1,2,3\n4,5\n", 2, false).unwrap_err();
        assert!(matches!(
            err,
            DataErr::RowLength {
                line: 2,
                got: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn rejects_empty_content() {
        let err = Dataset::parse_csv("x,y\n\n", 1, true).unwrap_err();
        assert!(matches!(err, DataErr::Empty));
    }

    #[test]
    fn rejects_misaligned_targets() {
        let err = Dataset::new(Array2::zeros((3, 2)), Array1::zeros(2)).unwrap_err();
        assert!(matches!(err, DataErr::RowCount { x: 3, y: 2 }));
    }

    fn numbered(rows: usize) -> Dataset {
        let x = Array2::from_shape_fn((rows, 2), |(r, c)| (r * 2 + c) as f64);
        let y = Array1::from_shape_fn(rows, |r| r as f64);
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn split_sizes_add_up() {
        let dataset = numbered(20);
        let mut rng = StdRng::seed_from_u64(1234);

        let splits = dataset.split(0.15, 0.25, true, &mut rng).unwrap();

        assert_eq!(splits.train.len(), 12);
        assert_eq!(splits.validation.len(), 3);
        assert_eq!(splits.test.len(), 5);

        let mut seen: Vec<_> = [&splits.train, &splits.validation, &splits.test]
            .iter()
            .flat_map(|d| d.y().to_vec())
            .map(|y| y as usize)
            .collect();
        seen.sort();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());

        // rows stay aligned with their targets
        for d in [&splits.train, &splits.validation, &splits.test] {
            for (x, y) in d.x().outer_iter().zip(d.y()) {
                assert_eq!(x[0], y * 2.);
            }
        }
    }

    #[test]
    fn unshuffled_split_keeps_order() {
        let dataset = numbered(10);
        let mut rng = StdRng::seed_from_u64(0);

        let splits = dataset.split(0.2, 0.2, false, &mut rng).unwrap();

        assert_eq!(splits.train.y(), &array![0., 1., 2., 3., 4., 5.]);
        assert_eq!(splits.validation.y(), &array![6., 7.]);
        assert_eq!(splits.test.y(), &array![8., 9.]);
    }

    #[test]
    fn split_is_reproducible() {
        let dataset = numbered(30);
        let a = dataset
            .split(0.2, 0.2, true, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = dataset
            .split(0.2, 0.2, true, &mut StdRng::seed_from_u64(9))
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn split_rejects_empty_sets() {
        let dataset = numbered(4);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(dataset.split(0.1, 0.25, false, &mut rng).is_err());
        assert!(dataset.split(0.5, 0.5, false, &mut rng).is_err());
    }

    #[test]
    fn scaler_maps_training_range_to_unit_interval() {
        let x = array![[1., 10., 3.], [3., 30., 3.], [2., 20., 3.]];
        let scaler = MinMaxScaler::fit(x.view());

        let scaled = scaler.transform(x.view());
        assert_eq!(
            scaled,
            array![[0., 0., 0.], [1., 1., 0.], [0.5, 0.5, 0.]]
        );

        // unseen data may fall outside the fitted range
        let other = scaler.transform(array![[5., 0., 4.]].view());
        assert_eq!(other, array![[2., -0.5, 1.]]);
    }

    #[test]
    fn scaler_fits_on_the_training_split_only() {
        let mut splits = Splits::new(
            Dataset::new(array![[0.], [10.]], array![0., 1.]).unwrap(),
            Dataset::new(array![[5.]], array![1.]).unwrap(),
            Dataset::new(array![[20.]], array![0.]).unwrap(),
        );

        MinMaxScaler::fit_splits(&mut splits);

        assert_eq!(splits.train.x(), &array![[0.], [1.]]);
        assert_eq!(splits.validation.x(), &array![[0.5]]);
        assert_eq!(splits.test.x(), &array![[2.]]);
    }
}
