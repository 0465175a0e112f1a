// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use rstest::rstest;

use infomeasure_ksg::Error;
use infomeasure_ksg::estimators::utils::parallel::{evaluate_local_values, partition};

#[rstest]
#[case(10, 3)]
#[case(7, 7)]
#[case(5, 12)]
#[case(1000, 8)]
#[case(0, 4)]
fn partitions_are_balanced_and_cover_everything(#[case] n: usize, #[case] parts: usize) {
    let ranges = partition(n, parts);
    assert!(!ranges.is_empty());
    assert!(ranges.len() <= parts.max(1));
    assert_eq!(ranges.first().unwrap().start, 0);
    assert_eq!(ranges.last().unwrap().end, n);
    for w in ranges.windows(2) {
        assert_eq!(w[0].end, w[1].start);
    }
    let lengths: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
    let min = *lengths.iter().min().unwrap();
    let max = *lengths.iter().max().unwrap();
    assert!(max - min <= 1);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(64)]
fn results_are_in_sample_order(#[case] workers: usize) {
    let values = evaluate_local_values(101, workers, |t| Ok((t as f64).sqrt())).unwrap();
    assert_eq!(values.len(), 101);
    for (t, v) in values.iter().enumerate() {
        assert_eq!(*v, (t as f64).sqrt());
    }
}

#[test]
fn first_error_aborts() {
    let result = evaluate_local_values(50, 4, |t| {
        if t == 30 {
            Err(Error::IndexOutOfRange { index: t, len: 30 })
        } else {
            Ok(0.0)
        }
    });
    assert_eq!(result, Err(Error::IndexOutOfRange { index: 30, len: 30 }));
}

#[test]
fn worker_panics_become_errors() {
    let result = evaluate_local_values(20, 2, |t| {
        if t == 15 {
            panic!("boom");
        }
        Ok(1.0)
    });
    assert_eq!(result, Err(Error::WorkerPanicked));
}

#[test]
fn empty_input() {
    let values = evaluate_local_values(0, 4, |_| Ok(1.0)).unwrap();
    assert!(values.is_empty());
}
