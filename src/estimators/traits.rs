// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

pub trait GlobalValue {
    /// Return the global value of the measure.
    fn global_value(&self) -> f64;
}

pub trait LocalValues: GlobalValue {
    /// Return the local values of the measure, one per sample.
    fn local_values(&self) -> Array1<f64>;

    /// Derive the global value as the mean of the local values (NaN when there are none).
    fn global_from_local(&self) -> f64 {
        self.local_values().mean().unwrap_or(f64::NAN)
    }
}

/// Optional interface for estimators whose local values may not be available yet.
///
/// Estimators that do support local values return supports_local() = true and provide
/// them via `Ok(Array1<f64>)` once computed; otherwise an Err with a brief reason.
pub trait OptionalLocalValues {
    fn supports_local(&self) -> bool;
    fn local_values_opt(&self) -> Result<Array1<f64>, &'static str>;
}

/// Marker trait for Mutual Information results.
pub trait MutualInformationEstimator: GlobalValue + OptionalLocalValues {}
