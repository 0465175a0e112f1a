// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::Array1;

use infomeasure_ksg::estimators::approaches::ksg::significance::SignificanceResult;
use infomeasure_ksg::estimators::approaches::ksg::{KsgConfig, KsgVariant, Seed};
use infomeasure_ksg::{Error, new_ksg_mi};

use crate::test_helpers::{correlated_gaussian_pair, generate_uniform_data};

fn seeded() -> KsgConfig {
    KsgConfig::default().with_noise(1e-8, Seed::Fixed(3)).unwrap()
}

#[test]
fn significance_does_not_alter_the_average() {
    let (x, y) = correlated_gaussian_pair(400, 0.4, 5);
    let mut mi = new_ksg_mi!(1, 1, seeded());
    mi.set_observations(&x, &y).unwrap();

    let before = mi.compute_average_local_of_observations().unwrap();
    let locals_before = mi.compute_local_of_observations().unwrap();
    let result = mi.compute_significance(10, Seed::Fixed(1)).unwrap();
    let after = mi.compute_average_local_of_observations().unwrap();

    assert_eq!(result.actual, before);
    assert_eq!(after, before);
    assert_eq!(mi.compute_local_of_observations().unwrap(), locals_before);
}

#[test]
fn dependent_data_is_significant() {
    let (x, y) = correlated_gaussian_pair(500, 0.8, 6);
    let mut mi = new_ksg_mi!(1, 1, seeded());
    mi.set_observations(&x, &y).unwrap();
    let result = mi.compute_significance(20, Seed::Fixed(2)).unwrap();

    assert_eq!(result.surrogates.len(), 20);
    assert_eq!(result.p_value, 0.0);
    assert!(result.mean.abs() < 0.1);
    assert!(result.z_score() > 3.0);
}

#[test]
fn independent_data_is_not_significant() {
    let x = generate_uniform_data(400, 1, 7);
    let y = generate_uniform_data(400, 1, 8);
    let mut mi = new_ksg_mi!(1, 1, seeded().with_variant(KsgVariant::Algorithm2));
    mi.set_observations(&x, &y).unwrap();
    let result = mi.compute_significance(30, Seed::Fixed(4)).unwrap();
    assert!((0.0..=1.0).contains(&result.p_value));
    assert!(result.std > 0.0);
    assert!(result.z_score().abs() < 4.0);
}

#[test]
fn seeded_permutations_are_reproducible() {
    let (x, y) = correlated_gaussian_pair(200, 0.3, 9);
    let mut mi = new_ksg_mi!(1, 1, seeded());
    mi.set_observations(&x, &y).unwrap();
    let a = mi.compute_significance(5, Seed::Fixed(11)).unwrap();
    let b = mi.compute_significance(5, Seed::Fixed(11)).unwrap();
    assert_eq!(a, b);
    assert_eq!(mi.compute_significance(0, Seed::Fixed(11)), Err(Error::NoPermutations));
}

#[test]
fn summary_statistics() {
    let result = SignificanceResult::new(0.5, Array1::from(vec![0.1, 0.6, 0.2, 0.5]));
    assert_abs_diff_eq!(result.p_value, 0.5);
    assert_abs_diff_eq!(result.mean, 0.35, epsilon = 1e-12);
    let var: f64 = [0.1_f64, 0.6, 0.2, 0.5]
        .iter()
        .map(|v| (v - 0.35).powi(2))
        .sum::<f64>()
        / 3.0;
    assert_abs_diff_eq!(result.std, var.sqrt(), epsilon = 1e-12);

    let single = SignificanceResult::new(0.0, Array1::from(vec![0.2]));
    assert_eq!(single.std, 0.0);
    assert!(single.z_score().is_nan());
}
