//! Tests for shared estimator utilities.
mod parallel_tests;
