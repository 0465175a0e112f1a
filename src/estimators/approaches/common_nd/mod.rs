// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

// Max-norm neighbour search shared by the kNN-based estimators

pub mod exclusion;
pub mod neighbour_index;
