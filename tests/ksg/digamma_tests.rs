// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;

use infomeasure_ksg::estimators::approaches::ksg::digamma::DigammaService;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[test]
fn integer_values_follow_harmonic_numbers() {
    let psi = DigammaService::new(4, 50);
    assert_abs_diff_eq!(psi.psi(1), -EULER_GAMMA, epsilon = 1e-12);
    let mut harmonic = 0.0;
    for n in 2..=50 {
        harmonic += 1.0 / (n - 1) as f64;
        assert_abs_diff_eq!(psi.psi(n), harmonic - EULER_GAMMA, epsilon = 1e-10);
    }
}

#[test]
fn cached_constants() {
    let psi = DigammaService::new(4, 10);
    assert_eq!(psi.k(), 4);
    assert_abs_diff_eq!(psi.digamma_k(), 1.0 + 0.5 + 1.0 / 3.0 - EULER_GAMMA, epsilon = 1e-10);
    assert_eq!(psi.inv_k(), 0.25);
}

#[test]
fn values_beyond_the_table_fall_back() {
    let psi = DigammaService::new(1, 5);
    let wide = DigammaService::new(1, 2000);
    assert_eq!(psi.psi(1500), wide.psi(1500));
    assert!(psi.psi(0).is_infinite());
}
