// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use ndarray::{Array1, ArrayView2};

use crate::error::{Error, Result};
use crate::estimators::traits::{
    GlobalValue, LocalValues, MutualInformationEstimator, OptionalLocalValues,
};

use super::config::{KsgConfig, KsgVariant, Seed, clamp_workers};
use super::observations::{ObservationData, ObservationSet, ObservationStore};
use super::preprocess::preprocess;
use super::reference::{KsgReference, NeighbourCounts};
use super::significance::{SignificanceResult, permutation_test};

/// Kraskov–Stögbauer–Grassberger mutual information estimator between X (`DX` columns)
/// and Y (`DY` columns), with `D_JOINT = DX + DY`.
///
/// Observations are added in sets, finalised, and then estimated. The fitted neighbour
/// indices are built lazily on the first estimate and kept until the observations or a
/// geometry-affecting setting (k, normalisation, noise, exclusion window) change.
///
/// Usually created with [`crate::new_ksg_mi!`]:
///
/// ```rust
/// use infomeasure_ksg::new_ksg_mi;
/// use ndarray::array;
///
/// let x = array![0.1, 0.7, 0.3, 0.9, 0.4, 0.2, 0.8];
/// let y = array![0.2, 0.6, 0.3, 1.0, 0.5, 0.1, 0.7];
///
/// let mut mi = new_ksg_mi!(1, 1);
/// mi.set_property("k", "2").unwrap();
/// mi.set_observations(&x, &y).unwrap();
/// let average = mi.compute_average_local_of_observations().unwrap();
/// assert!(average.is_finite());
/// ```
pub struct KsgMutualInformation<const D_JOINT: usize, const DX: usize, const DY: usize> {
    config: KsgConfig,
    store: ObservationStore<DX, DY>,
    reference: Option<Arc<KsgReference<D_JOINT, DX, DY>>>,
    locals: Option<Array1<f64>>,
    /// Thread policy resolved when the configuration was set.
    threads: usize,
}

/// Local values and their mean from one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct KsgEstimate {
    pub local: Array1<f64>,
    pub average: f64,
}

impl GlobalValue for KsgEstimate {
    fn global_value(&self) -> f64 {
        self.average
    }
}

impl LocalValues for KsgEstimate {
    fn local_values(&self) -> Array1<f64> {
        self.local.clone()
    }
}

impl OptionalLocalValues for KsgEstimate {
    fn supports_local(&self) -> bool {
        true
    }

    fn local_values_opt(&self) -> std::result::Result<Array1<f64>, &'static str> {
        Ok(self.local.clone())
    }
}

impl MutualInformationEstimator for KsgEstimate {}

impl<const D_JOINT: usize, const DX: usize, const DY: usize> Default
    for KsgMutualInformation<D_JOINT, DX, DY>
{
    fn default() -> Self {
        Self::with_config(KsgConfig::default())
    }
}

impl<const D_JOINT: usize, const DX: usize, const DY: usize> KsgMutualInformation<D_JOINT, DX, DY> {
    /// Estimator with default settings, initialised for `DX` and `DY`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KsgConfig) -> Self {
        let mut store = ObservationStore::new();
        // Zero dimensions leave the store uninitialised; adding then fails with NotInitialised.
        if let Err(err) = store.initialise(DX, DY) {
            tracing::warn!(%err, "KSG estimator left uninitialised");
        }
        let threads = config.threads.thread_count();
        Self {
            config,
            store,
            reference: None,
            locals: None,
            threads,
        }
    }

    pub fn config(&self) -> &KsgConfig {
        &self.config
    }

    /// Replace the settings; fitted indices survive unless their geometry changed.
    pub fn set_config(&mut self, config: KsgConfig) {
        if !self.config.same_geometry(&config) {
            self.reference = None;
            self.locals = None;
        } else if self.config.variant != config.variant {
            self.locals = None;
        }
        if self.config.threads != config.threads {
            self.threads = config.threads.thread_count();
        }
        self.config = config;
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
        let mut config = self.config.clone();
        config.set_property(key, value)?;
        tracing::debug!(key, value, "set KSG property");
        self.set_config(config);
        Ok(())
    }

    pub fn property(&self, key: &str) -> Result<String> {
        self.config.property(key)
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// ψ(k) for the configured k.
    pub fn digamma_k(&self) -> f64 {
        match &self.reference {
            Some(reference) => reference.digamma().digamma_k(),
            None => statrs::function::gamma::digamma(self.config.k as f64),
        }
    }

    /// Reset all observations and bind the dimensions of X and Y.
    pub fn initialise(&mut self, dx: usize, dy: usize) -> Result<()> {
        if D_JOINT != DX + DY {
            return Err(Error::JointDimension {
                joint: D_JOINT,
                sum: DX + DY,
            });
        }
        self.invalidate();
        self.store.initialise(dx, dy)
    }

    pub fn start_add_observations(&mut self) -> Result<()> {
        self.invalidate();
        self.store.start_add_observations()
    }

    pub fn add_observations<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
    ) -> Result<()> {
        self.store.add_observations(x, y)
    }

    pub fn add_observations_range<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
        start: usize,
        len: usize,
    ) -> Result<()> {
        self.store.add_observations_range(x, y, start, len)
    }

    pub fn finalise_add_observations(&mut self) -> Result<()> {
        self.invalidate();
        self.store.finalise_add_observations()
    }

    /// Replace all observations with a single set and finalise.
    pub fn set_observations<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
    ) -> Result<()> {
        self.invalidate();
        self.store.set_observations(x, y)
    }

    pub fn num_observations(&self) -> usize {
        self.store.num_observations()
    }

    pub fn num_observation_sets(&self) -> usize {
        self.store.num_observation_sets()
    }

    pub fn observation_sets(&self) -> &[ObservationSet] {
        self.store.sets()
    }

    pub fn observation_set_indices(&self) -> Result<&[usize]> {
        self.store.observation_set_indices()
    }

    pub fn observation_time_points(&self) -> Result<&[usize]> {
        self.store.observation_time_points()
    }

    /// Shared read-only snapshot of the fitted model, building it if needed.
    pub fn frozen_reference(&mut self) -> Result<Arc<KsgReference<D_JOINT, DX, DY>>> {
        if let Some(reference) = &self.reference {
            return Ok(Arc::clone(reference));
        }
        if !self.store.is_finalised() {
            return Err(Error::NotFinalised);
        }
        let exclusion = self.store.exclusion(self.config.exclusion_window)?;
        let data = preprocess(self.store.x_points(), self.store.y_points(), &self.config);
        let reference = Arc::new(KsgReference::build(
            data,
            Arc::new(exclusion),
            self.config.k,
        )?);
        self.reference = Some(Arc::clone(&reference));
        Ok(reference)
    }

    /// Evaluate every local value of the fitted observations.
    pub fn estimate(&mut self) -> Result<KsgEstimate> {
        let local = self.compute_local_of_observations()?;
        let average = local.mean().unwrap_or(0.0);
        Ok(KsgEstimate { local, average })
    }

    /// Average local mutual information (nats) over the fitted observations.
    pub fn compute_average_local_of_observations(&mut self) -> Result<f64> {
        Ok(self.estimate()?.average)
    }

    /// Local mutual information (nats) of each fitted observation, in sample order.
    pub fn compute_local_of_observations(&mut self) -> Result<Array1<f64>> {
        if let Some(locals) = &self.locals {
            return Ok(locals.clone());
        }
        let reference = self.frozen_reference()?;
        let workers = self.workers(reference.num_observations());
        tracing::debug!(
            n = reference.num_observations(),
            variant = %self.config.variant,
            workers,
            "computing KSG local values"
        );
        let locals = reference.local_values(self.config.variant, workers)?;
        self.locals = Some(locals.clone());
        Ok(locals)
    }

    /// Score new observations against the fitted observations.
    ///
    /// The new rows get the training normalisation but no noise, are compared only with
    /// the fitted samples and never with each other, and use N + 1 as their population.
    /// Re-scoring the training data itself needs k + 1 to skip each point's own copy.
    pub fn compute_local_using_previous_observations<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
    ) -> Result<Array1<f64>> {
        let (x, y) = (x.into(), y.into());
        if x.nrows() != y.nrows() {
            return Err(Error::RowMismatch {
                x_rows: x.nrows(),
                y_rows: y.nrows(),
            });
        }
        let mut x_points = x.points::<DX>("x", 0, x.nrows())?;
        let mut y_points = y.points::<DY>("y", 0, y.nrows())?;
        let reference = self.frozen_reference()?;
        reference.normalise_new(&mut x_points, &mut y_points);
        let workers = self.workers(x_points.len());
        reference.local_values_for_new(&x_points, &y_points, self.config.variant, workers)
    }

    /// Neighbour statistics behind the local value of fitted sample `t`.
    pub fn partial_compute_from_observations(&mut self, t: usize) -> Result<NeighbourCounts> {
        let reference = self.frozen_reference()?;
        reference.neighbour_counts(t, self.config.variant)
    }

    /// Neighbour statistics of row `t` of new observations that are already normalised.
    pub fn partial_compute_from_new_observations(
        &mut self,
        t: usize,
        norm_x: ArrayView2<'_, f64>,
        norm_y: ArrayView2<'_, f64>,
    ) -> Result<NeighbourCounts> {
        let reference = self.frozen_reference()?;
        reference.neighbour_counts_for_new_row(t, norm_x, norm_y, self.config.variant)
    }

    /// Experimental H(X|Y) = H(X) - I(X;Y), with H(X) from the Kozachenko–Leonenko estimator
    /// evaluated at the joint neighbour radii. Only checked on Gaussian and uniform data.
    pub fn compute_average_conditional_entropy(&mut self) -> Result<f64> {
        let reference = self.frozen_reference()?;
        let workers = self.workers(reference.num_observations());
        let h_x = reference.marginal_entropy_x(workers)?;
        let mi = self.compute_average_local_of_observations()?;
        tracing::debug!(h_x, mi, "conditional entropy");
        Ok(h_x - mi)
    }

    /// H(X|Y) from a caller-supplied marginal entropy of X.
    pub fn conditional_entropy_given_marginal(&mut self, h_x: f64) -> Result<f64> {
        Ok(h_x - self.compute_average_local_of_observations()?)
    }

    /// Permutation test of the estimate against `num_permutations` shuffles of Y.
    ///
    /// The estimator's own fitted model and local values are left untouched.
    pub fn compute_significance(
        &mut self,
        num_permutations: usize,
        seed: Seed,
    ) -> Result<SignificanceResult> {
        if num_permutations == 0 {
            return Err(Error::NoPermutations);
        }
        let actual = self.compute_average_local_of_observations()?;
        let reference = self.frozen_reference()?;
        let workers = self.workers(reference.num_observations());
        permutation_test(
            &reference,
            actual,
            self.config.variant,
            workers,
            num_permutations,
            seed,
        )
    }

    pub fn variant(&self) -> KsgVariant {
        self.config.variant
    }

    /// Worker threads available to local-value evaluation.
    pub fn worker_threads(&self) -> usize {
        self.threads
    }

    fn workers(&self, work_items: usize) -> usize {
        clamp_workers(self.threads, work_items)
    }

    fn invalidate(&mut self) {
        self.reference = None;
        self.locals = None;
    }
}

impl<const D_JOINT: usize, const DX: usize, const DY: usize> OptionalLocalValues
    for KsgMutualInformation<D_JOINT, DX, DY>
{
    fn supports_local(&self) -> bool {
        true
    }

    fn local_values_opt(&self) -> std::result::Result<Array1<f64>, &'static str> {
        self.locals
            .clone()
            .ok_or("local values are computed by compute_local_of_observations")
    }
}
