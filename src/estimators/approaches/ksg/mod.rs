// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kraskov–Stögbauer–Grassberger (KSG) nearest-neighbour mutual information.
//!
//! Both KSG algorithms are available through [`KsgVariant`]. Distances are max-norm, and
//! samples of the same observation set may be kept out of each other's neighbourhood by a
//! temporal exclusion window.

pub mod config;
pub mod digamma;
pub mod estimator;
pub mod observations;
pub mod preprocess;
pub mod reference;
pub mod significance;

pub use config::{KsgConfig, KsgVariant, Seed, ThreadPolicy};
pub use estimator::{KsgEstimate, KsgMutualInformation};
pub use observations::{ObservationData, ObservationSet};
pub use reference::{KsgReference, NeighbourCounts};
pub use significance::SignificanceResult;
