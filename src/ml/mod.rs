//! Machine learning building blocks for the predictor.
//!
//! Everything here works on positional `f64` rows; the named-field contract
//! lives in [`crate::dataset::schema`] and is converted at the model boundary.

pub mod forest;
pub mod metrics;
pub mod split;
pub mod tree;

use thiserror::Error;

/// Input validation failures shared by trees and forests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Empty training set")]
    Empty,
    #[error("Mismatched X/Y lengths: {rows} rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("Row {row} has {found} features but expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} contains a non-finite value")]
    NonFinite { row: usize },
    #[error("Row index {index} out of range for {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },
    #[error("Class label {label} out of range for {n_classes} classes")]
    InvalidClass { label: usize, n_classes: usize },
    #[error("A forest needs at least one tree")]
    NoTrees,
}

/// Check a row-major matrix against its targets; returns the feature count.
pub(crate) fn validate_matrix(x: &[Vec<f64>], targets: usize) -> Result<usize, FitError> {
    if x.len() != targets {
        return Err(FitError::LengthMismatch {
            rows: x.len(),
            targets,
        });
    }
    let Some(first) = x.first() else {
        return Err(FitError::Empty);
    };
    let expected = first.len();
    for (row, values) in x.iter().enumerate() {
        if values.len() != expected {
            return Err(FitError::RaggedRow {
                row,
                expected,
                found: values.len(),
            });
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(FitError::NonFinite { row });
        }
    }
    Ok(expected)
}
