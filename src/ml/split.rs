//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test fraction {0} must lie strictly between 0 and 1")]
    InvalidFraction(f64),
    #[error("{rows} rows cannot be split into non-empty train and test partitions")]
    TooFewRows { rows: usize },
}

/// Row indices of one train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with `seed` and hold out `ceil(n_rows * test_fraction)` rows.
///
/// The same partition is meant to be applied to every target so evaluations
/// stay comparable.
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, SplitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }
    let test_n = ((n_rows as f64) * test_fraction).ceil() as usize;
    if test_n == 0 || test_n >= n_rows {
        return Err(SplitError::TooFewRows { rows: n_rows });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(test_n);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_out_ceil_fraction_and_covers_every_row() {
        let split = train_test_split(101, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_partition() {
        let a = train_test_split(50, 0.2, 42).unwrap();
        let b = train_test_split(50, 0.2, 42).unwrap();
        let c = train_test_split(50, 0.2, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(
            train_test_split(1, 0.2, 42),
            Err(SplitError::TooFewRows { rows: 1 })
        );
        assert_eq!(
            train_test_split(0, 0.2, 42),
            Err(SplitError::TooFewRows { rows: 0 })
        );
        assert_eq!(
            train_test_split(10, 1.0, 42),
            Err(SplitError::InvalidFraction(1.0))
        );
        assert!(train_test_split(10, f64::NAN, 42).is_err());
    }
}
