// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column standardisation and jitter applied once, before the neighbour indices are built.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{KsgConfig, Seed};

/// Per-column mean and standard deviation of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats<const D: usize> {
    pub means: [f64; D],
    pub std_devs: [f64; D],
}

impl<const D: usize> ColumnStats<D> {
    pub fn from_points(points: &[[f64; D]]) -> Self {
        let mut means = [0.0; D];
        let mut std_devs = [0.0; D];
        for dim in 0..D {
            // Single-pass Welford's algorithm
            let mut mean = 0.0;
            let mut m2 = 0.0;
            let mut count = 0.0;
            for point in points {
                count += 1.0;
                let delta = point[dim] - mean;
                mean += delta / count;
                let delta2 = point[dim] - mean;
                m2 += delta * delta2;
            }
            let variance = if count < 2.0 { 0.0 } else { m2 / count };
            means[dim] = mean;
            std_devs[dim] = variance.sqrt();
        }
        Self { means, std_devs }
    }

    /// Z-score a single point; zero-variance columns keep their raw values.
    #[inline]
    pub fn standardise(&self, point: &mut [f64; D]) {
        for dim in 0..D {
            if self.std_devs[dim] > 0.0 {
                point[dim] = (point[dim] - self.means[dim]) / self.std_devs[dim];
            }
        }
    }

    pub fn standardise_all(&self, points: &mut [[f64; D]]) {
        for point in points.iter_mut() {
            self.standardise(point);
        }
    }

    pub fn zero_variance_columns(&self) -> Vec<usize> {
        (0..D).filter(|&dim| self.std_devs[dim] <= 0.0).collect()
    }
}

/// Standardise every column in place and return the statistics used.
pub fn normalise<const D: usize>(points: &mut [[f64; D]], variable: &'static str) -> ColumnStats<D> {
    let stats = ColumnStats::from_points(points);
    for dim in stats.zero_variance_columns() {
        tracing::warn!(variable, column = dim, "zero variance column left unnormalised");
    }
    stats.standardise_all(points);
    stats
}

pub fn noise_rng(seed: Seed) -> StdRng {
    match seed {
        Seed::Fixed(seed) => StdRng::seed_from_u64(seed),
        Seed::Unseeded => StdRng::from_entropy(),
    }
}

/// Add independent uniform jitter from [-level/2, level/2] to every coordinate.
pub fn add_uniform_noise<const D: usize, R: Rng>(points: &mut [[f64; D]], level: f64, rng: &mut R) {
    if level <= 0.0 {
        return;
    }
    let half = level / 2.0;
    for point in points.iter_mut() {
        for value in point.iter_mut() {
            *value += rng.gen_range(-half..=half);
        }
    }
}

/// Samples of X and Y after normalisation and noise, with the statistics needed to
/// transform new observations the same way.
#[derive(Debug, Clone)]
pub struct Preprocessed<const DX: usize, const DY: usize> {
    pub x: Vec<[f64; DX]>,
    pub y: Vec<[f64; DY]>,
    pub x_stats: Option<ColumnStats<DX>>,
    pub y_stats: Option<ColumnStats<DY>>,
}

/// Normalise (if enabled) and then add noise (if enabled).
pub fn preprocess<const DX: usize, const DY: usize>(
    x: &[[f64; DX]],
    y: &[[f64; DY]],
    config: &KsgConfig,
) -> Preprocessed<DX, DY> {
    let mut x = x.to_vec();
    let mut y = y.to_vec();
    let (x_stats, y_stats) = if config.normalize {
        (Some(normalise(&mut x, "x")), Some(normalise(&mut y, "y")))
    } else {
        (None, None)
    };
    if config.noise_level > 0.0 {
        let mut rng = noise_rng(config.noise_seed);
        add_uniform_noise(&mut x, config.noise_level, &mut rng);
        add_uniform_noise(&mut y, config.noise_level, &mut rng);
    }
    Preprocessed {
        x,
        y,
        x_stats,
        y_stats,
    }
}
