// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2, array};

use infomeasure_ksg::Error;
use infomeasure_ksg::estimators::approaches::ksg::ObservationSet;
use infomeasure_ksg::estimators::approaches::ksg::observations::ObservationStore;

use crate::test_helpers::generate_uniform_data;

#[test]
fn set_indices_and_time_points_follow_insertion_order() {
    let x = generate_uniform_data(20, 2, 1);
    let y = generate_uniform_data(20, 1, 2);

    let mut store = ObservationStore::<2, 1>::new();
    store.initialise(2, 1).unwrap();
    store.start_add_observations().unwrap();
    store.add_observations_range(&x, &y, 5, 10).unwrap();
    store.add_observations(&x, &y).unwrap();
    store.add_observations_range(&x, &y, 17, 3).unwrap();
    store.finalise_add_observations().unwrap();

    assert_eq!(store.num_observations(), 33);
    assert_eq!(store.num_observation_sets(), 3);
    assert_eq!(
        store.sets(),
        &[
            ObservationSet { start: 5, len: 10 },
            ObservationSet { start: 0, len: 20 },
            ObservationSet { start: 17, len: 3 },
        ]
    );

    let set_ids = store.observation_set_indices().unwrap();
    let times = store.observation_time_points().unwrap();
    assert_eq!(set_ids.len(), 33);
    assert!(set_ids.windows(2).all(|w| w[0] <= w[1]));

    let expected_times: Vec<usize> = (5..15).chain(0..20).chain(17..20).collect();
    assert_eq!(times, expected_times.as_slice());
    assert_eq!(&set_ids[..10], &[0; 10]);
    assert_eq!(&set_ids[10..30], &[1; 20]);
    assert_eq!(&set_ids[30..], &[2; 3]);

    // Rows are copied from the requested range
    assert_eq!(store.x_points()[0], [x[[5, 0]], x[[5, 1]]]);
    assert_eq!(store.y_points()[32], [y[[19, 0]]]);
}

#[test]
fn one_dimensional_arrays_are_accepted_for_univariate_variables() {
    let x = Array1::from(vec![1.0, 2.0, 3.0]);
    let y = array![[1.0], [0.0], [2.0]];
    let mut store = ObservationStore::<1, 1>::new();
    store.initialise(1, 1).unwrap();
    store.set_observations(&x, &y).unwrap();
    assert!(store.is_finalised());
    assert_eq!(store.x_points(), &[[1.0], [2.0], [3.0]]);
    assert_eq!(store.observation_time_points().unwrap(), &[0, 1, 2]);
}

#[test]
fn protocol_errors() {
    let x = array![[1.0], [2.0]];
    let y = array![[1.0], [2.0]];

    let mut store = ObservationStore::<1, 1>::new();
    assert_eq!(store.start_add_observations(), Err(Error::NotInitialised));
    assert_eq!(store.add_observations(&x, &y), Err(Error::NotInitialised));
    assert_eq!(store.observation_set_indices(), Err(Error::NotFinalised));

    store.initialise(1, 1).unwrap();
    assert_eq!(store.finalise_add_observations(), Err(Error::NoObservations));
    store.add_observations(&x, &y).unwrap();
    store.finalise_add_observations().unwrap();

    assert_eq!(store.add_observations(&x, &y), Err(Error::AlreadyFinalised));
    assert_eq!(store.start_add_observations(), Err(Error::AlreadyFinalised));
    assert_eq!(store.finalise_add_observations(), Err(Error::AlreadyFinalised));

    // Re-initialising clears everything
    store.initialise(1, 1).unwrap();
    assert_eq!(store.num_observations(), 0);
    assert!(!store.is_finalised());
}

#[test]
fn dimension_checks() {
    let mut store = ObservationStore::<2, 1>::new();
    assert_eq!(store.initialise(0, 1), Err(Error::InvalidDimensions { dx: 0, dy: 1 }));
    assert_eq!(
        store.initialise(1, 1),
        Err(Error::DimensionBinding {
            expected_dx: 2,
            expected_dy: 1,
            dx: 1,
            dy: 1
        })
    );
    store.initialise(2, 1).unwrap();

    let x_narrow = array![[1.0], [2.0]];
    let y = array![[1.0], [2.0]];
    assert_eq!(
        store.add_observations(&x_narrow, &y),
        Err(Error::ColumnMismatch {
            variable: "x",
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn data_errors() {
    let x = array![[1.0], [2.0], [3.0]];
    let y_short = array![[1.0], [2.0]];
    let y = array![[1.0], [f64::NAN], [3.0]];

    let mut store = ObservationStore::<1, 1>::new();
    store.initialise(1, 1).unwrap();
    assert_eq!(
        store.add_observations(&x, &y_short),
        Err(Error::RowMismatch { x_rows: 3, y_rows: 2 })
    );
    assert_eq!(
        store.add_observations_range(&x, &x, 2, 2),
        Err(Error::RangeOutOfBounds {
            start: 2,
            end: 4,
            rows: 3
        })
    );
    assert_eq!(store.add_observations_range(&x, &x, 1, 0), Err(Error::EmptyObservationSet));
    assert_eq!(
        store.add_observations(&x, &y),
        Err(Error::NonFiniteObservation { variable: "y", row: 1 })
    );
    // Failed adds leave nothing behind
    assert_eq!(store.num_observations(), 0);

    let empty: Array2<f64> = Array2::zeros((0, 1));
    assert_eq!(store.add_observations(&empty, &empty), Err(Error::EmptyObservationSet));
}

#[test]
fn exclusion_reflects_sets() {
    let x = array![[1.0], [2.0], [3.0], [4.0]];
    let mut store = ObservationStore::<1, 1>::new();
    store.initialise(1, 1).unwrap();
    store.add_observations(&x, &x).unwrap();
    store.add_observations_range(&x, &x, 1, 2).unwrap();
    store.finalise_add_observations().unwrap();

    let exclusion = store.exclusion(1).unwrap();
    assert_eq!(exclusion.len(), 6);
    assert!(exclusion.excludes(0, 1));
    // Last sample of set 0 has time 3, first sample of set 1 has time 1: different sets
    assert!(!exclusion.excludes(3, 4));
    assert!(exclusion.excludes(4, 5));
}
