// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::gamma::digamma;

/// Digamma values for integer arguments, tabulated once per fitted model.
///
/// Neighbour counts and populations never exceed `max_n`, so the hot path is a table
/// lookup. Values outside the table fall back to `statrs`.
#[derive(Debug, Clone)]
pub struct DigammaService {
    k: usize,
    digamma_k: f64,
    inv_k: f64,
    table: Vec<f64>,
}

impl DigammaService {
    pub fn new(k: usize, max_n: usize) -> Self {
        let table = (0..=max_n)
            .map(|n| if n == 0 { f64::NEG_INFINITY } else { digamma(n as f64) })
            .collect();
        Self {
            k,
            digamma_k: digamma(k as f64),
            inv_k: 1.0 / k as f64,
            table,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// ψ(k)
    pub fn digamma_k(&self) -> f64 {
        self.digamma_k
    }

    /// 1/k
    pub fn inv_k(&self) -> f64 {
        self.inv_k
    }

    #[inline]
    pub fn psi(&self, n: usize) -> f64 {
        match self.table.get(n) {
            Some(&value) => value,
            None => digamma(n as f64),
        }
    }
}
