// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permutation test for the KSG estimate.
//!
//! Shuffling Y relative to X destroys any dependence between them while keeping both
//! marginals, so the surrogate estimates sample the null distribution of the estimator.

use std::sync::Arc;

use ndarray::Array1;
use rand::seq::SliceRandom;

use crate::error::{Error, Result};

use super::config::{KsgVariant, Seed};
use super::preprocess::{Preprocessed, noise_rng};
use super::reference::KsgReference;

/// Outcome of a permutation test.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceResult {
    /// Estimate on the unpermuted samples.
    pub actual: f64,
    /// Estimate on each permuted copy, in permutation order.
    pub surrogates: Array1<f64>,
    /// Fraction of surrogates at least as large as `actual`.
    pub p_value: f64,
    pub mean: f64,
    /// Sample standard deviation of the surrogates (0 for a single permutation).
    pub std: f64,
}

impl SignificanceResult {
    pub fn new(actual: f64, surrogates: Array1<f64>) -> Self {
        let count = surrogates.len();
        let exceeding = surrogates.iter().filter(|&&s| s >= actual).count();
        let mean = surrogates.mean().unwrap_or(f64::NAN);
        let std = if count > 1 { surrogates.std(1.0) } else { 0.0 };
        Self {
            actual,
            p_value: exceeding as f64 / count.max(1) as f64,
            surrogates,
            mean,
            std,
        }
    }

    /// Number of standard deviations between `actual` and the surrogate mean.
    pub fn z_score(&self) -> f64 {
        if self.std > 0.0 {
            (self.actual - self.mean) / self.std
        } else {
            f64::NAN
        }
    }
}

/// Re-estimate on `num_permutations` copies of the fitted samples with Y shuffled.
///
/// The permutations act on the preprocessed samples of `reference`, so no new noise is
/// drawn and the temporal exclusion of the fitted model carries over unchanged.
pub fn permutation_test<const D_JOINT: usize, const DX: usize, const DY: usize>(
    reference: &KsgReference<D_JOINT, DX, DY>,
    actual: f64,
    variant: KsgVariant,
    workers: usize,
    num_permutations: usize,
    seed: Seed,
) -> Result<SignificanceResult> {
    if num_permutations == 0 {
        return Err(Error::NoPermutations);
    }
    let n = reference.num_observations();
    let mut rng = noise_rng(seed);
    let mut order: Vec<usize> = (0..n).collect();
    let mut surrogates = Vec::with_capacity(num_permutations);

    tracing::debug!(num_permutations, n, "starting permutation test");
    for permutation in 0..num_permutations {
        order.shuffle(&mut rng);
        let shuffled = Preprocessed {
            x: reference.x_points().to_vec(),
            y: order.iter().map(|&j| reference.y_points()[j]).collect(),
            x_stats: None,
            y_stats: None,
        };
        let surrogate = KsgReference::<D_JOINT, DX, DY>::build(
            shuffled,
            Arc::clone(reference.exclusion()),
            reference.k(),
        )?;
        let locals = surrogate.local_values(variant, workers)?;
        let value = locals.mean().unwrap_or(0.0);
        tracing::trace!(permutation, value, "surrogate estimate");
        surrogates.push(value);
    }

    Ok(SignificanceResult::new(actual, Array1::from(surrogates)))
}
