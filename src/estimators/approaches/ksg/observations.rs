// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Joint (x, y) samples grouped into time-ordered observation sets.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Error, Result};
use crate::estimators::approaches::common_nd::exclusion::TemporalExclusion;

/// Input representation for one variable of an observation set.
///
/// One-dimensional arrays are accepted for univariate variables; rows of a two-dimensional
/// array are samples and its columns are dimensions.
#[derive(Debug, Clone, Copy)]
pub enum ObservationData<'a> {
    OneDimensional(ArrayView1<'a, f64>),
    TwoDimensional(ArrayView2<'a, f64>),
}

impl<'a> From<ArrayView1<'a, f64>> for ObservationData<'a> {
    fn from(view: ArrayView1<'a, f64>) -> Self {
        ObservationData::OneDimensional(view)
    }
}

impl<'a> From<ArrayView2<'a, f64>> for ObservationData<'a> {
    fn from(view: ArrayView2<'a, f64>) -> Self {
        ObservationData::TwoDimensional(view)
    }
}

impl<'a> From<&'a Array1<f64>> for ObservationData<'a> {
    fn from(array: &'a Array1<f64>) -> Self {
        ObservationData::OneDimensional(array.view())
    }
}

impl<'a> From<&'a Array2<f64>> for ObservationData<'a> {
    fn from(array: &'a Array2<f64>) -> Self {
        ObservationData::TwoDimensional(array.view())
    }
}

impl ObservationData<'_> {
    pub fn nrows(&self) -> usize {
        match self {
            ObservationData::OneDimensional(v) => v.len(),
            ObservationData::TwoDimensional(v) => v.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            ObservationData::OneDimensional(_) => 1,
            ObservationData::TwoDimensional(v) => v.ncols(),
        }
    }

    fn row<const D: usize>(&self, r: usize) -> [f64; D] {
        let mut p = [0.0; D];
        match self {
            ObservationData::OneDimensional(v) => p[0] = v[r],
            ObservationData::TwoDimensional(v) => {
                for (c, value) in p.iter_mut().enumerate() {
                    *value = v[(r, c)];
                }
            }
        }
        p
    }

    /// Copy rows `[start, start + len)` into points, checking width and finiteness.
    pub(crate) fn points<const D: usize>(
        &self,
        variable: &'static str,
        start: usize,
        len: usize,
    ) -> Result<Vec<[f64; D]>> {
        if self.ncols() != D {
            return Err(Error::ColumnMismatch {
                variable,
                expected: D,
                found: self.ncols(),
            });
        }
        let end = start.checked_add(len).unwrap_or(usize::MAX);
        if end > self.nrows() {
            return Err(Error::RangeOutOfBounds {
                start,
                end,
                rows: self.nrows(),
            });
        }
        (start..end)
            .map(|r| {
                let p = self.row::<D>(r);
                if p.iter().all(|v| v.is_finite()) {
                    Ok(p)
                } else {
                    Err(Error::NonFiniteObservation { variable, row: r })
                }
            })
            .collect()
    }
}

/// A contiguous run of samples added as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSet {
    /// Row offset in the caller's buffer the set was cut from; its first time point.
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreState {
    Uninitialised,
    Accepting,
    Finalised,
}

/// Holds the joint samples of X (DX columns) and Y (DY columns).
#[derive(Debug, Clone)]
pub struct ObservationStore<const DX: usize, const DY: usize> {
    state: StoreState,
    x: Vec<[f64; DX]>,
    y: Vec<[f64; DY]>,
    sets: Vec<ObservationSet>,
    set_indices: Vec<usize>,
    time_points: Vec<usize>,
}

impl<const DX: usize, const DY: usize> Default for ObservationStore<DX, DY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DX: usize, const DY: usize> ObservationStore<DX, DY> {
    pub fn new() -> Self {
        Self {
            state: StoreState::Uninitialised,
            x: Vec::new(),
            y: Vec::new(),
            sets: Vec::new(),
            set_indices: Vec::new(),
            time_points: Vec::new(),
        }
    }

    /// Reset all state and bind the dimensions of X and Y.
    pub fn initialise(&mut self, dx: usize, dy: usize) -> Result<()> {
        if dx == 0 || dy == 0 {
            return Err(Error::InvalidDimensions { dx, dy });
        }
        if dx != DX || dy != DY {
            return Err(Error::DimensionBinding {
                expected_dx: DX,
                expected_dy: DY,
                dx,
                dy,
            });
        }
        *self = Self::new();
        self.state = StoreState::Accepting;
        Ok(())
    }

    /// Discard sets added since initialisation.
    pub fn start_add_observations(&mut self) -> Result<()> {
        self.check_accepting()?;
        self.clear_samples();
        Ok(())
    }

    /// Append all rows of `x` and `y` as a new observation set.
    pub fn add_observations<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
    ) -> Result<()> {
        let (x, y) = (x.into(), y.into());
        let rows = x.nrows();
        self.add_observations_range(x, y, 0, rows)
    }

    /// Append rows `[start, start + len)` of `x` and `y` as a new observation set.
    pub fn add_observations_range<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
        start: usize,
        len: usize,
    ) -> Result<()> {
        self.check_accepting()?;
        let (x, y) = (x.into(), y.into());
        if x.nrows() != y.nrows() {
            return Err(Error::RowMismatch {
                x_rows: x.nrows(),
                y_rows: y.nrows(),
            });
        }
        if len == 0 {
            return Err(Error::EmptyObservationSet);
        }
        let x_points = x.points::<DX>("x", start, len)?;
        let y_points = y.points::<DY>("y", start, len)?;

        self.x.extend(x_points);
        self.y.extend(y_points);
        self.sets.push(ObservationSet { start, len });
        Ok(())
    }

    /// Lock the sample count and derive per-sample set ids and time points.
    pub fn finalise_add_observations(&mut self) -> Result<()> {
        self.check_accepting()?;
        if self.sets.is_empty() {
            return Err(Error::NoObservations);
        }
        let n = self.x.len();
        let mut set_indices = Vec::with_capacity(n);
        let mut time_points = Vec::with_capacity(n);
        for (id, set) in self.sets.iter().enumerate() {
            set_indices.extend(std::iter::repeat_n(id, set.len));
            time_points.extend(set.start..set.start + set.len);
        }
        self.set_indices = set_indices;
        self.time_points = time_points;
        self.state = StoreState::Finalised;
        tracing::debug!(
            observations = n,
            sets = self.sets.len(),
            "finalised observations"
        );
        Ok(())
    }

    /// Replace all observations with a single set and finalise.
    pub fn set_observations<'a>(
        &mut self,
        x: impl Into<ObservationData<'a>>,
        y: impl Into<ObservationData<'a>>,
    ) -> Result<()> {
        *self = Self::new();
        self.state = StoreState::Accepting;
        self.add_observations(x, y)?;
        self.finalise_add_observations()
    }

    pub fn is_finalised(&self) -> bool {
        self.state == StoreState::Finalised
    }

    pub fn num_observations(&self) -> usize {
        self.x.len()
    }

    pub fn num_observation_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn sets(&self) -> &[ObservationSet] {
        &self.sets
    }

    pub fn x_points(&self) -> &[[f64; DX]] {
        &self.x
    }

    pub fn y_points(&self) -> &[[f64; DY]] {
        &self.y
    }

    /// Set id of every sample.
    pub fn observation_set_indices(&self) -> Result<&[usize]> {
        self.check_finalised()?;
        Ok(&self.set_indices)
    }

    /// Time point (set start + offset within the set) of every sample.
    pub fn observation_time_points(&self) -> Result<&[usize]> {
        self.check_finalised()?;
        Ok(&self.time_points)
    }

    pub fn exclusion(&self, window: usize) -> Result<TemporalExclusion> {
        self.check_finalised()?;
        Ok(TemporalExclusion::new(
            window,
            self.set_indices.clone(),
            self.time_points.clone(),
        ))
    }

    fn clear_samples(&mut self) {
        self.x.clear();
        self.y.clear();
        self.sets.clear();
        self.set_indices.clear();
        self.time_points.clear();
    }

    fn check_accepting(&self) -> Result<()> {
        match self.state {
            StoreState::Uninitialised => Err(Error::NotInitialised),
            StoreState::Accepting => Ok(()),
            StoreState::Finalised => Err(Error::AlreadyFinalised),
        }
    }

    fn check_finalised(&self) -> Result<()> {
        match self.state {
            StoreState::Finalised => Ok(()),
            _ => Err(Error::NotFinalised),
        }
    }
}
