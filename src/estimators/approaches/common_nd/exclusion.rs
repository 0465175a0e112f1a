// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Temporal (Theiler) exclusion shared by all neighbour indices built over the same samples.
///
/// Sample `j` is excluded as a neighbour of sample `i` when `j == i`, or when both lie in the
/// same observation set and `|time(i) - time(j)| <= window`. Samples of different sets are
/// never excluded from each other. Within a set, time points must be strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalExclusion {
    window: usize,
    set_indices: Vec<usize>,
    time_points: Vec<usize>,
    excluded_counts: Vec<usize>,
}

impl TemporalExclusion {
    pub fn new(window: usize, set_indices: Vec<usize>, time_points: Vec<usize>) -> Self {
        assert_eq!(
            set_indices.len(),
            time_points.len(),
            "set indices and time points must have equal length"
        );
        let mut exclusion = Self {
            window,
            set_indices,
            time_points,
            excluded_counts: Vec::new(),
        };
        exclusion.excluded_counts = (0..exclusion.len())
            .map(|i| exclusion.scan_excluded(i))
            .collect();
        exclusion
    }

    /// Exclusion that only removes each sample from its own neighbourhood.
    pub fn disabled(n: usize) -> Self {
        Self {
            window: 0,
            set_indices: vec![0; n],
            time_points: (0..n).collect(),
            excluded_counts: vec![0; n],
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.set_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set_indices.is_empty()
    }

    #[inline]
    pub fn excludes(&self, i: usize, j: usize) -> bool {
        if i == j {
            return true;
        }
        self.window > 0
            && self.set_indices[i] == self.set_indices[j]
            && self.time_points[i].abs_diff(self.time_points[j]) <= self.window
    }

    /// Number of other samples excluded from the neighbourhood of sample `i` (self not counted).
    #[inline]
    pub fn excluded_count(&self, i: usize) -> usize {
        self.excluded_counts[i]
    }

    pub fn max_excluded_count(&self) -> usize {
        self.excluded_counts.iter().copied().max().unwrap_or(0)
    }

    // Same-set samples are contiguous and time-ordered, so the excluded ones form a run around i.
    fn scan_excluded(&self, i: usize) -> usize {
        if self.window == 0 {
            return 0;
        }
        let mut count = 0;
        let mut j = i;
        while j > 0 && self.excludes(i, j - 1) {
            count += 1;
            j -= 1;
        }
        let mut j = i + 1;
        while j < self.len() && self.excludes(i, j) {
            count += 1;
            j += 1;
        }
        count
    }
}
