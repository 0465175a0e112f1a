// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;

use infomeasure_ksg::estimators::approaches::ksg::{KsgConfig, Seed};
use infomeasure_ksg::new_ksg_mi;

use crate::test_helpers::{generate_gaussian_data, generate_uniform_data};

#[test]
fn normalised_gaussian_given_independent_noise() {
    // Normalised X is standard normal, so H(X|Y) = H(X) = 0.5 ln(2 pi e)
    let x = generate_gaussian_data(2000, 1, 3.0, 2.5, 10);
    let y = generate_gaussian_data(2000, 1, 0.0, 1.0, 11);
    let mut mi = new_ksg_mi!(1, 1, KsgConfig::default().with_noise(1e-8, Seed::Fixed(1)).unwrap());
    mi.set_observations(&x, &y).unwrap();

    let expected = 0.5 * (2.0 * std::f64::consts::PI * std::f64::consts::E).ln();
    let h = mi.compute_average_conditional_entropy().unwrap();
    assert_abs_diff_eq!(h, expected, epsilon = 0.05);

    let mi_value = mi.compute_average_local_of_observations().unwrap();
    assert_abs_diff_eq!(
        mi.conditional_entropy_given_marginal(expected).unwrap(),
        expected - mi_value,
        epsilon = 1e-12
    );
}

#[test]
fn unnormalised_uniform_has_zero_entropy() {
    // U(0, 1) has differential entropy 0
    let x = generate_uniform_data(2000, 1, 20);
    let y = generate_uniform_data(2000, 1, 21);
    let config = KsgConfig::default()
        .with_normalize(false)
        .with_noise(1e-8, Seed::Fixed(2))
        .unwrap();
    let mut mi = new_ksg_mi!(1, 1, config);
    mi.set_observations(&x, &y).unwrap();
    let h = mi.compute_average_conditional_entropy().unwrap();
    assert_abs_diff_eq!(h, 0.0, epsilon = 0.05);
}

#[test]
fn conditioning_on_a_dependent_variable_lowers_entropy() {
    let x = generate_gaussian_data(1500, 1, 0.0, 1.0, 30);
    let noise = generate_gaussian_data(1500, 1, 0.0, 0.3, 31);
    let y = &x + &noise;
    let mut mi = new_ksg_mi!(1, 1, KsgConfig::default().with_noise(1e-8, Seed::Fixed(3)).unwrap());
    mi.set_observations(&x, &y).unwrap();
    let h_cond = mi.compute_average_conditional_entropy().unwrap();
    let h_x = 0.5 * (2.0 * std::f64::consts::PI * std::f64::consts::E).ln();
    assert!(h_cond < h_x - 0.5, "H(X|Y) = {h_cond}");
}
