// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::Result;
use crate::estimators::approaches::ksg::{KsgConfig, KsgMutualInformation};

/// Macro for creating a new `KsgMutualInformation` estimator.
///
/// This macro computes the joint dimension from the dimensionalities of X and Y, so
/// callers never spell out `D_JOINT` themselves.
///
/// # Arguments
/// * `$dx`: `usize` - Number of columns of X.
/// * `$dy`: `usize` - Number of columns of Y.
/// * `$config`: `KsgConfig` - Optional estimator settings (defaults otherwise).
#[macro_export]
macro_rules! new_ksg_mi {
    ($dx:expr, $dy:expr) => {{
        const D_JOINT: usize = $dx + $dy;
        $crate::estimators::approaches::ksg::KsgMutualInformation::<D_JOINT, { $dx }, { $dy }>::new()
    }};
    ($dx:expr, $dy:expr, $config:expr) => {{
        const D_JOINT: usize = $dx + $dy;
        $crate::estimators::approaches::ksg::KsgMutualInformation::<D_JOINT, { $dx }, { $dy }>::with_config(
            $config,
        )
    }};
}

pub struct MutualInformation;

impl MutualInformation {
    /// KSG estimator with the given settings. Prefer [`crate::new_ksg_mi!`] when the joint
    /// dimension should be derived automatically.
    pub fn new_ksg<const D_JOINT: usize, const DX: usize, const DY: usize>(
        config: KsgConfig,
    ) -> KsgMutualInformation<D_JOINT, DX, DY> {
        KsgMutualInformation::with_config(config)
    }

    /// KSG estimator fitted to a single observation set of X and Y.
    pub fn ksg_from_observations<'a, const D_JOINT: usize, const DX: usize, const DY: usize>(
        x: impl Into<crate::estimators::approaches::ksg::ObservationData<'a>>,
        y: impl Into<crate::estimators::approaches::ksg::ObservationData<'a>>,
        config: KsgConfig,
    ) -> Result<KsgMutualInformation<D_JOINT, DX, DY>> {
        let mut estimator = KsgMutualInformation::with_config(config);
        estimator.set_observations(x, y)?;
        Ok(estimator)
    }
}
