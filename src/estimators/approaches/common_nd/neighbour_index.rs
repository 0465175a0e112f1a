// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::sync::Arc;

use kiddo::traits::DistanceMetric;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use ndarray::ArrayView2;

use super::exclusion::TemporalExclusion;

/// Chebyshev distance metric (L-infinity norm) for kiddo.
pub struct Chebyshev;

impl<const K: usize> DistanceMetric<f64, K> for Chebyshev {
    fn dist(a: &[f64; K], b: &[f64; K]) -> f64 {
        let mut max = 0.0;
        for i in 0..K {
            let diff = (a[i] - b[i]).abs();
            if diff > max {
                max = diff;
            }
        }
        max
    }

    fn dist1(a: f64, b: f64) -> f64 {
        (a - b).abs()
    }
}

/// Whether a point lying exactly on the query radius is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusBoundary {
    /// distance < radius
    Strict,
    /// distance <= radius
    Inclusive,
}

impl RadiusBoundary {
    #[inline]
    pub fn admits(self, distance: f64, radius: f64) -> bool {
        match self {
            RadiusBoundary::Strict => distance < radius,
            RadiusBoundary::Inclusive => distance <= radius,
        }
    }
}

/// A neighbour returned by a k-NN query, with its max-norm distance to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub index: usize,
    pub distance: f64,
}

fn by_distance_then_index(a: &Neighbour, b: &Neighbour) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.index.cmp(&b.index))
}

/// Max-norm neighbour index over K-dimensional points with temporal exclusion.
///
/// The kiddo tree is queried with squared Euclidean distances. Since a Chebyshev ball of
/// radius `r` lies inside the Euclidean ball of radius `r * sqrt(K)`, those queries return a
/// superset of the wanted points, and every candidate is then re-checked with the exact
/// max-norm distance. Boundary decisions therefore never depend on the tree.
pub struct NeighbourIndex<const K: usize> {
    pub points: Vec<[f64; K]>,
    pub n: usize,
    tree: ImmutableKdTree<f64, K>,
    exclusion: Arc<TemporalExclusion>,
}

impl<const K: usize> NeighbourIndex<K> {
    pub fn new(points: Vec<[f64; K]>, exclusion: Arc<TemporalExclusion>) -> Self {
        assert_eq!(
            points.len(),
            exclusion.len(),
            "exclusion metadata must cover every point"
        );
        let n = points.len();
        let tree = ImmutableKdTree::new_from_slice(&points);
        tracing::trace!(n, dims = K, "built neighbour index");
        Self {
            points,
            n,
            tree,
            exclusion,
        }
    }

    /// Index without temporal exclusion (each point only excludes itself).
    pub fn without_exclusion(points: Vec<[f64; K]>) -> Self {
        let exclusion = Arc::new(TemporalExclusion::disabled(points.len()));
        Self::new(points, exclusion)
    }

    pub fn from_array2(data: ArrayView2<'_, f64>, exclusion: Arc<TemporalExclusion>) -> Self {
        Self::new(points_from_view::<K>(data), exclusion)
    }

    pub fn exclusion(&self) -> &TemporalExclusion {
        &self.exclusion
    }

    #[inline]
    pub fn distance(a: &[f64; K], b: &[f64; K]) -> f64 {
        <Chebyshev as DistanceMetric<f64, K>>::dist(a, b)
    }

    /// The k nearest admissible neighbours of indexed point `i`, ordered by (distance, index).
    pub fn k_nearest(&self, i: usize, k: usize) -> Vec<Neighbour> {
        let exclusion = &self.exclusion;
        let rejected = 1 + exclusion.excluded_count(i);
        self.k_nearest_filtered(&self.points[i], k, rejected, |j| !exclusion.excludes(i, j))
    }

    pub fn kth_neighbour_distance(&self, i: usize, k: usize) -> f64 {
        self.k_nearest(i, k)
            .last()
            .map_or(f64::INFINITY, |nb| nb.distance)
    }

    /// The k nearest indexed points to an external query point; nothing is excluded.
    pub fn k_nearest_to(&self, query: &[f64; K], k: usize) -> Vec<Neighbour> {
        self.k_nearest_filtered(query, k, 0, |_| true)
    }

    /// Number of admissible neighbours of indexed point `i` within `radius`.
    pub fn count_within_radius(&self, i: usize, radius: f64, boundary: RadiusBoundary) -> usize {
        let exclusion = &self.exclusion;
        self.count_filtered(&self.points[i], radius, boundary, |j| {
            !exclusion.excludes(i, j)
        })
    }

    /// Number of indexed points within `radius` of an external query point.
    pub fn count_within_radius_of(
        &self,
        query: &[f64; K],
        radius: f64,
        boundary: RadiusBoundary,
    ) -> usize {
        self.count_filtered(query, radius, boundary, |_| true)
    }

    // Squared Euclidean radius whose ball contains the max-norm ball of the given squared radius.
    fn superset_radius2(radius2: f64) -> f64 {
        radius2 * (K as f64) * (1.0 + 1e-9) + f64::MIN_POSITIVE
    }

    fn k_nearest_filtered<F>(
        &self,
        query: &[f64; K],
        k: usize,
        max_rejected: usize,
        admissible: F,
    ) -> Vec<Neighbour>
    where
        F: Fn(usize) -> bool,
    {
        let qty = (k + max_rejected).min(self.n);
        let Some(qty) = NonZeroUsize::new(qty) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        // The k-th admissible Euclidean neighbour bounds the k-th max-norm distance.
        let euclidean = self.tree.nearest_n::<SquaredEuclidean>(query, qty);
        let bound2 = euclidean
            .iter()
            .filter(|nn| admissible(nn.item as usize))
            .nth(k - 1)
            .map(|nn| nn.distance);

        let mut candidates: Vec<Neighbour> = match bound2 {
            Some(bound2) => self
                .tree
                .within_unsorted::<SquaredEuclidean>(query, Self::superset_radius2(bound2))
                .into_iter()
                .map(|nn| nn.item as usize)
                .filter(|&j| admissible(j))
                .map(|j| Neighbour {
                    index: j,
                    distance: Self::distance(query, &self.points[j]),
                })
                .collect(),
            None => self.linear_candidates(query, &admissible),
        };

        if candidates.len() > k {
            candidates.select_nth_unstable_by(k - 1, by_distance_then_index);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(by_distance_then_index);
        candidates
    }

    // Linear scan, used when the tree cannot supply k admissible points.
    fn linear_candidates<F>(&self, query: &[f64; K], admissible: &F) -> Vec<Neighbour>
    where
        F: Fn(usize) -> bool,
    {
        (0..self.n)
            .filter(|&j| admissible(j))
            .map(|j| Neighbour {
                index: j,
                distance: Self::distance(query, &self.points[j]),
            })
            .collect()
    }

    fn count_filtered<F>(
        &self,
        query: &[f64; K],
        radius: f64,
        boundary: RadiusBoundary,
        admissible: F,
    ) -> usize
    where
        F: Fn(usize) -> bool,
    {
        if self.n == 0 || radius.is_nan() || radius < 0.0 {
            return 0;
        }
        self.tree
            .within_unsorted::<SquaredEuclidean>(query, Self::superset_radius2(radius * radius))
            .iter()
            .filter(|nn| {
                let j = nn.item as usize;
                admissible(j) && boundary.admits(Self::distance(query, &self.points[j]), radius)
            })
            .count()
    }
}

/// Convert rows of a 2D view with exactly K columns into owned points.
pub fn points_from_view<const K: usize>(data: ArrayView2<'_, f64>) -> Vec<[f64; K]> {
    assert!(data.ncols() == K, "data.ncols() must equal K");
    let n = data.nrows();
    let mut points: Vec<[f64; K]> = Vec::with_capacity(n);
    if let Some(slice) = data.as_slice() {
        for chunk in slice.chunks_exact(K) {
            let mut p = [0.0; K];
            p.copy_from_slice(&chunk[..K]);
            points.push(p);
        }
    } else {
        for r in 0..n {
            let mut p = [0.0; K];
            for c in 0..K {
                p[c] = data[(r, c)];
            }
            points.push(p);
        }
    }
    points
}
