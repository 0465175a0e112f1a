// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors raised while configuring, feeding or evaluating an estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("dimensions must be positive; got dx = {dx}, dy = {dy}")]
    InvalidDimensions { dx: usize, dy: usize },

    #[error("estimator is bound to dx = {expected_dx}, dy = {expected_dy}; got dx = {dx}, dy = {dy}")]
    DimensionBinding {
        expected_dx: usize,
        expected_dy: usize,
        dx: usize,
        dy: usize,
    },

    #[error("joint dimension {joint} must equal dx + dy = {sum}")]
    JointDimension { joint: usize, sum: usize },

    #[error("k must be >= 1; got {0}")]
    InvalidK(usize),

    #[error("invalid value {value:?} for property {key:?}: {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("unknown property {0:?}")]
    UnknownProperty(String),

    #[error("observations must be initialised before they can be added")]
    NotInitialised,

    #[error("observations were already finalised; call initialise again to add more")]
    AlreadyFinalised,

    #[error("observations have not been finalised")]
    NotFinalised,

    #[error("no observations were added before finalising")]
    NoObservations,

    #[error("{variable} has {found} columns but the estimator expects {expected}")]
    ColumnMismatch {
        variable: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("x has {x_rows} rows but y has {y_rows}")]
    RowMismatch { x_rows: usize, y_rows: usize },

    #[error("rows [{start}, {end}) lie outside the {rows} supplied rows")]
    RangeOutOfBounds { start: usize, end: usize, rows: usize },

    #[error("an observation set must contain at least one row")]
    EmptyObservationSet,

    #[error("non-finite value in {variable} at row {row}")]
    NonFiniteObservation { variable: &'static str, row: usize },

    #[error("k = {k} needs at least k comparable points but sample {sample} has only {available}")]
    KTooLarge {
        k: usize,
        sample: usize,
        available: usize,
    },

    #[error("sample index {index} is out of range for {len} observations")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("number of permutations must be >= 1")]
    NoPermutations,

    #[error("a worker thread panicked during the estimate")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
