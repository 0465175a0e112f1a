// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # infomeasure-ksg
//!
//! Kraskov–Stögbauer–Grassberger (KSG) estimation of the mutual information between two
//! continuous, possibly multivariate, random variables.
//!
//! ## Quick Start
//!
//! ```rust
//! use infomeasure_ksg::new_ksg_mi;
//! use infomeasure_ksg::estimators::traits::GlobalValue;
//! use ndarray::array;
//!
//! let x = array![[0.1], [0.7], [0.3], [0.9], [0.4], [0.2], [0.8], [0.5]];
//! let y = array![[0.2], [0.6], [0.3], [1.0], [0.5], [0.1], [0.7], [0.4]];
//!
//! let mut mi = new_ksg_mi!(1, 1);
//! mi.set_property("k", "3").unwrap();
//! mi.set_property("noise-seed", "42").unwrap();
//! mi.set_observations(&x, &y).unwrap();
//! let estimate = mi.estimate().unwrap();
//! println!("I(X;Y) = {} nats", estimate.global_value());
//! ```
//!
//! ## Estimation
//!
//! For every sample the distance to its k-th nearest neighbour in the joint (X, Y) space is
//! found under the max-norm, and the neighbours of the sample inside that radius are counted
//! in each marginal space. Digamma functions of those counts give the local mutual
//! information of the sample; their mean is the estimate, in nats.
//!
//! | Algorithm | Marginal radius | Marginal count |
//! |-----------|-----------------|----------------|
//! | 1 | joint k-th neighbour distance | strict (`<`) |
//! | 2 | per-axis maximum over the k neighbours | inclusive (`<=`) |
//!
//! Samples can be added in several observation sets. A dynamic correlation exclusion
//! (Theiler) window keeps temporally close samples of the same set out of each other's
//! neighbourhoods.
//!
//! ## Architecture
//!
//! 1. **Public API Layer**: the `MutualInformation` factory and the `new_ksg_mi!` macro
//! 2. **Estimation**: `KsgMutualInformation` with its frozen `KsgReference` model
//! 3. **Core Infrastructure**: max-norm neighbour indices, temporal exclusion, shared traits
//! 4. **Performance Layer**: scoped worker threads over contiguous sample ranges
//!
//! The library logs through `tracing` and never installs a subscriber itself.

pub mod error;
pub mod estimators;

pub use error::{Error, Result};
pub use estimators::approaches::ksg::{KsgConfig, KsgMutualInformation, KsgVariant};
