// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fork/join evaluation of per-sample values over contiguous sample ranges.

use std::ops::Range;

use ndarray::Array1;

use crate::error::{Error, Result};

/// Split `[0, n)` into `parts` contiguous ranges whose lengths differ by at most one.
pub fn partition(n: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, n.max(1));
    let base = n / parts;
    let remainder = n % parts;
    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for p in 0..parts {
        let len = base + usize::from(p < remainder);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Evaluate `f` for every sample in `[0, n)` on `workers` threads.
///
/// Each worker owns one range from [`partition`]; results are concatenated in sample order.
/// With one worker everything runs on the calling thread. The first error (or a worker
/// panic) aborts the whole evaluation.
pub fn evaluate_local_values<F>(n: usize, workers: usize, f: F) -> Result<Array1<f64>>
where
    F: Fn(usize) -> Result<f64> + Sync,
{
    if n == 0 {
        return Ok(Array1::zeros(0));
    }
    let ranges = partition(n, workers);
    if ranges.len() == 1 {
        let values = (0..n).map(&f).collect::<Result<Vec<f64>>>()?;
        return Ok(Array1::from(values));
    }

    let f = &f;
    let slices: Vec<Result<Vec<f64>>> = std::thread::scope(|s| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|range| {
                s.spawn(move || {
                    tracing::trace!(start = range.start, end = range.end, "worker started");
                    range.map(f).collect::<Result<Vec<f64>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(slice) => slice,
                Err(_) => Err(Error::WorkerPanicked),
            })
            .collect()
    });

    let mut values = Vec::with_capacity(n);
    for slice in slices {
        values.extend(slice?);
    }
    Ok(Array1::from(values))
}
