// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use infomeasure_ksg::estimators::approaches::common_nd::exclusion::TemporalExclusion;
use infomeasure_ksg::estimators::approaches::common_nd::neighbour_index::NeighbourIndex;

#[test]
fn disabled_exclusion_only_removes_self() {
    let exclusion = TemporalExclusion::disabled(5);
    assert_eq!(exclusion.len(), 5);
    assert_eq!(exclusion.window(), 0);
    for i in 0..5 {
        assert_eq!(exclusion.excluded_count(i), 0);
        for j in 0..5 {
            assert_eq!(exclusion.excludes(i, j), i == j);
        }
    }
}

#[test]
fn window_counts_are_clipped_at_set_edges() {
    // Two sets of 6 samples each, window 2
    let set_ids = vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
    let times = vec![0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5];
    let exclusion = TemporalExclusion::new(2, set_ids, times);

    let counts: Vec<usize> = (0..12).map(|i| exclusion.excluded_count(i)).collect();
    assert_eq!(counts, vec![2, 3, 4, 4, 3, 2, 2, 3, 4, 4, 3, 2]);
    assert_eq!(exclusion.max_excluded_count(), 4);

    // Same time point but a different set is never excluded
    assert!(!exclusion.excludes(0, 6));
    assert!(!exclusion.excludes(5, 6));
    assert!(exclusion.excludes(2, 4));
    assert!(!exclusion.excludes(2, 5));
}

#[test]
fn time_points_with_offsets_are_compared_not_indices() {
    // A single set cut from rows 10..14 keeps its source time labels
    let exclusion = TemporalExclusion::new(1, vec![0; 4], vec![10, 11, 12, 13]);
    assert!(exclusion.excludes(0, 1));
    assert!(!exclusion.excludes(0, 2));
    assert_eq!(exclusion.excluded_count(0), 1);
    assert_eq!(exclusion.excluded_count(1), 2);
}

#[test]
fn excluded_samples_never_appear_as_neighbours() {
    let n = 40;
    let points: Vec<[f64; 1]> = (0..n).map(|t| [t as f64 * 0.5]).collect();
    let exclusion = Arc::new(TemporalExclusion::new(3, vec![0; n], (0..n).collect()));
    let index = NeighbourIndex::new(points, exclusion.clone());

    for i in 0..n {
        let neighbours = index.k_nearest(i, 4);
        assert_eq!(neighbours.len(), 4);
        for nb in &neighbours {
            assert!(i.abs_diff(nb.index) > 3, "sample {i} got excluded neighbour {}", nb.index);
        }
    }
    // Interior sample 20: admissible neighbours at |dt| = 4, 5
    let nearest: Vec<usize> = index.k_nearest(20, 4).iter().map(|nb| nb.index).collect();
    assert_eq!(nearest, vec![16, 24, 15, 25]);
}
