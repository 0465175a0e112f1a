// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fitted KSG model: the joint and marginal neighbour indices over the preprocessed samples.
//!
//! A [`KsgReference`] is immutable once built. The estimator shares it behind an `Arc`, so
//! worker threads and callers scoring new observations read it concurrently without locks.

use std::sync::Arc;

use ndarray::{Array1, ArrayView2};

use crate::error::{Error, Result};
use crate::estimators::approaches::common_nd::exclusion::TemporalExclusion;
use crate::estimators::approaches::common_nd::neighbour_index::{
    Neighbour, NeighbourIndex, RadiusBoundary, points_from_view,
};
use crate::estimators::utils::parallel::evaluate_local_values;

use super::config::KsgVariant;
use super::digamma::DigammaService;
use super::preprocess::{ColumnStats, Preprocessed};

/// Raw neighbour statistics behind one local value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighbourCounts {
    /// Distance to the k-th joint-space neighbour.
    pub joint_radius: f64,
    /// Radius used for the X-marginal count (joint radius for algorithm 1).
    pub radius_x: f64,
    /// Radius used for the Y-marginal count (joint radius for algorithm 1).
    pub radius_y: f64,
    pub n_x: usize,
    pub n_y: usize,
    /// Digamma population: N for fitted samples (exclusion never shrinks it) and N + 1
    /// for a new point scored against the fitted samples.
    pub population: usize,
}

/// Immutable snapshot of a fitted KSG estimator.
pub struct KsgReference<const D_JOINT: usize, const DX: usize, const DY: usize> {
    joint: NeighbourIndex<D_JOINT>,
    x: NeighbourIndex<DX>,
    y: NeighbourIndex<DY>,
    exclusion: Arc<TemporalExclusion>,
    digamma: DigammaService,
    x_stats: Option<ColumnStats<DX>>,
    y_stats: Option<ColumnStats<DY>>,
}

pub(crate) fn concat<const D_JOINT: usize, const DX: usize, const DY: usize>(
    x: &[f64; DX],
    y: &[f64; DY],
) -> [f64; D_JOINT] {
    let mut joint = [0.0; D_JOINT];
    joint[..DX].copy_from_slice(x);
    joint[DX..].copy_from_slice(y);
    joint
}

impl<const D_JOINT: usize, const DX: usize, const DY: usize> KsgReference<D_JOINT, DX, DY> {
    /// Build the three indices over preprocessed samples.
    ///
    /// Fails when some sample has fewer than k comparable points once itself and its
    /// exclusion window are removed.
    pub fn build(
        data: Preprocessed<DX, DY>,
        exclusion: Arc<TemporalExclusion>,
        k: usize,
    ) -> Result<Self> {
        if D_JOINT != DX + DY {
            return Err(Error::JointDimension {
                joint: D_JOINT,
                sum: DX + DY,
            });
        }
        if k == 0 {
            return Err(Error::InvalidK(k));
        }
        let n = data.x.len();
        if n == 0 {
            return Err(Error::NoObservations);
        }
        for sample in 0..n {
            let available = n - 1 - exclusion.excluded_count(sample);
            if available < k {
                return Err(Error::KTooLarge {
                    k,
                    sample,
                    available,
                });
            }
        }

        let joint_points: Vec<[f64; D_JOINT]> = data
            .x
            .iter()
            .zip(data.y.iter())
            .map(|(x, y)| concat::<D_JOINT, DX, DY>(x, y))
            .collect();

        tracing::debug!(
            n,
            k,
            dx = DX,
            dy = DY,
            exclusion_window = exclusion.window(),
            "building KSG neighbour indices"
        );
        Ok(Self {
            joint: NeighbourIndex::new(joint_points, exclusion.clone()),
            x: NeighbourIndex::new(data.x, exclusion.clone()),
            y: NeighbourIndex::new(data.y, exclusion.clone()),
            exclusion,
            digamma: DigammaService::new(k, n + 1),
            x_stats: data.x_stats,
            y_stats: data.y_stats,
        })
    }

    pub fn num_observations(&self) -> usize {
        self.joint.n
    }

    pub fn k(&self) -> usize {
        self.digamma.k()
    }

    pub fn digamma(&self) -> &DigammaService {
        &self.digamma
    }

    pub fn exclusion(&self) -> &Arc<TemporalExclusion> {
        &self.exclusion
    }

    /// Preprocessed X samples.
    pub fn x_points(&self) -> &[[f64; DX]] {
        &self.x.points
    }

    /// Preprocessed Y samples.
    pub fn y_points(&self) -> &[[f64; DY]] {
        &self.y.points
    }

    pub fn x_stats(&self) -> Option<&ColumnStats<DX>> {
        self.x_stats.as_ref()
    }

    pub fn y_stats(&self) -> Option<&ColumnStats<DY>> {
        self.y_stats.as_ref()
    }

    /// Neighbour statistics of fitted sample `t`.
    pub fn neighbour_counts(&self, t: usize, variant: KsgVariant) -> Result<NeighbourCounts> {
        let n = self.num_observations();
        if t >= n {
            return Err(Error::IndexOutOfRange { index: t, len: n });
        }
        let neighbours = self.joint.k_nearest(t, self.k());
        let x_query = &self.x.points[t];
        let y_query = &self.y.points[t];
        Ok(self.counts_from_neighbours(
            variant,
            &neighbours,
            x_query,
            y_query,
            n,
            |radius, boundary| self.x.count_within_radius(t, radius, boundary),
            |radius, boundary| self.y.count_within_radius(t, radius, boundary),
        ))
    }

    /// Neighbour statistics of a new point against the reference samples only.
    ///
    /// The point is expected to be preprocessed already; nothing is excluded.
    pub fn neighbour_counts_for_new(
        &self,
        x_query: &[f64; DX],
        y_query: &[f64; DY],
        variant: KsgVariant,
    ) -> NeighbourCounts {
        let joint_query = concat::<D_JOINT, DX, DY>(x_query, y_query);
        let neighbours = self.joint.k_nearest_to(&joint_query, self.k());
        self.counts_from_neighbours(
            variant,
            &neighbours,
            x_query,
            y_query,
            self.num_observations() + 1,
            |radius, boundary| self.x.count_within_radius_of(x_query, radius, boundary),
            |radius, boundary| self.y.count_within_radius_of(y_query, radius, boundary),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn counts_from_neighbours<CX, CY>(
        &self,
        variant: KsgVariant,
        neighbours: &[Neighbour],
        x_query: &[f64; DX],
        y_query: &[f64; DY],
        population: usize,
        count_x: CX,
        count_y: CY,
    ) -> NeighbourCounts
    where
        CX: Fn(f64, RadiusBoundary) -> usize,
        CY: Fn(f64, RadiusBoundary) -> usize,
    {
        let joint_radius = neighbours.last().map_or(0.0, |nb| nb.distance);
        let (radius_x, radius_y, boundary) = match variant {
            KsgVariant::Algorithm1 => (joint_radius, joint_radius, RadiusBoundary::Strict),
            KsgVariant::Algorithm2 => {
                let mut radius_x: f64 = 0.0;
                let mut radius_y: f64 = 0.0;
                for nb in neighbours {
                    radius_x = radius_x
                        .max(NeighbourIndex::<DX>::distance(x_query, &self.x.points[nb.index]));
                    radius_y = radius_y
                        .max(NeighbourIndex::<DY>::distance(y_query, &self.y.points[nb.index]));
                }
                (radius_x, radius_y, RadiusBoundary::Inclusive)
            }
        };
        NeighbourCounts {
            joint_radius,
            radius_x,
            radius_y,
            n_x: count_x(radius_x, boundary),
            n_y: count_y(radius_y, boundary),
            population,
        }
    }

    /// Digamma-corrected local value for a set of neighbour counts.
    #[inline]
    pub fn local_from_counts(&self, counts: &NeighbourCounts, variant: KsgVariant) -> f64 {
        let psi = &self.digamma;
        match variant {
            KsgVariant::Algorithm1 => {
                psi.digamma_k() - psi.psi(counts.n_x + 1) - psi.psi(counts.n_y + 1)
                    + psi.psi(counts.population)
            }
            KsgVariant::Algorithm2 => {
                psi.digamma_k() - psi.inv_k() - psi.psi(counts.n_x) - psi.psi(counts.n_y)
                    + psi.psi(counts.population)
            }
        }
    }

    pub fn local_value(&self, t: usize, variant: KsgVariant) -> Result<f64> {
        let counts = self.neighbour_counts(t, variant)?;
        Ok(self.local_from_counts(&counts, variant))
    }

    /// Local values of every fitted sample, evaluated on `workers` threads.
    pub fn local_values(&self, variant: KsgVariant, workers: usize) -> Result<Array1<f64>> {
        evaluate_local_values(self.num_observations(), workers, |t| {
            self.local_value(t, variant)
        })
    }

    /// Apply the training normalisation to raw new observations.
    pub fn normalise_new(&self, x: &mut [[f64; DX]], y: &mut [[f64; DY]]) {
        if let Some(stats) = &self.x_stats {
            stats.standardise_all(x);
        }
        if let Some(stats) = &self.y_stats {
            stats.standardise_all(y);
        }
    }

    /// Score preprocessed new points against the reference samples.
    pub fn local_values_for_new(
        &self,
        x: &[[f64; DX]],
        y: &[[f64; DY]],
        variant: KsgVariant,
        workers: usize,
    ) -> Result<Array1<f64>> {
        if x.len() != y.len() {
            return Err(Error::RowMismatch {
                x_rows: x.len(),
                y_rows: y.len(),
            });
        }
        let n = self.num_observations();
        if self.k() > n {
            return Err(Error::KTooLarge {
                k: self.k(),
                sample: 0,
                available: n,
            });
        }
        evaluate_local_values(x.len(), workers, |t| {
            let counts = self.neighbour_counts_for_new(&x[t], &y[t], variant);
            Ok(self.local_from_counts(&counts, variant))
        })
    }

    /// Neighbour statistics of row `t` of already-normalised new observations.
    pub fn neighbour_counts_for_new_row(
        &self,
        t: usize,
        norm_x: ArrayView2<'_, f64>,
        norm_y: ArrayView2<'_, f64>,
        variant: KsgVariant,
    ) -> Result<NeighbourCounts> {
        if norm_x.ncols() != DX {
            return Err(Error::ColumnMismatch {
                variable: "x",
                expected: DX,
                found: norm_x.ncols(),
            });
        }
        if norm_y.ncols() != DY {
            return Err(Error::ColumnMismatch {
                variable: "y",
                expected: DY,
                found: norm_y.ncols(),
            });
        }
        if norm_x.nrows() != norm_y.nrows() {
            return Err(Error::RowMismatch {
                x_rows: norm_x.nrows(),
                y_rows: norm_y.nrows(),
            });
        }
        let rows = norm_x.nrows();
        if t >= rows {
            return Err(Error::IndexOutOfRange { index: t, len: rows });
        }
        let x_row = points_from_view::<DX>(norm_x.slice(ndarray::s![t..t + 1, ..]));
        let y_row = points_from_view::<DY>(norm_y.slice(ndarray::s![t..t + 1, ..]));
        Ok(self.neighbour_counts_for_new(&x_row[0], &y_row[0], variant))
    }

    /// Kozachenko–Leonenko entropy of X with max-norm cubes, reusing the joint radii and
    /// the strict X counts of algorithm 1.
    pub fn marginal_entropy_x(&self, workers: usize) -> Result<f64> {
        let psi = &self.digamma;
        let locals = evaluate_local_values(self.num_observations(), workers, |t| {
            let counts = self.neighbour_counts(t, KsgVariant::Algorithm1)?;
            let mut h = -psi.psi(counts.n_x + 1) + psi.psi(counts.population);
            // Duplicate points give a zero radius; drop the volume term as for the KL estimator
            if counts.joint_radius > 0.0 {
                h += DX as f64 * (2.0 * counts.joint_radius).ln();
            }
            Ok(h)
        })?;
        Ok(locals.mean().unwrap_or(0.0))
    }
}
