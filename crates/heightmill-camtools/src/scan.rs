//! Area-covering scan strategies
//!
//! Both strategies are boustrophedon sweeps over `[0, extent_x] x [0, extent_y]`
//! at a fixed stepover. Raster sweeps columns along Y; crosshatch sweeps rows
//! along X and is meant as a second pass over a raster-finished surface.

use crate::error::{CamError, CamResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Absorbs rounding when the extent is an exact multiple of the step.
const STEP_SLACK: f64 = 1e-9;

/// Scan pattern selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    /// Columns at fixed X, sweeping Y up then down
    Raster,
    /// Rows at fixed Y, sweeping X right then left
    Crosshatch,
}

impl ScanStrategy {
    /// Lazy sample sequence covering the work area
    ///
    /// Fails when the step is not a finite positive number or the pass would
    /// exceed [`MAX_SCAN_SAMPLES`].
    pub fn path(self, extent_x: f64, extent_y: f64, step: f64) -> CamResult<ScanPath> {
        let xs = Axis::new(extent_x, step)?;
        let ys = Axis::new(extent_y, step)?;
        let total = xs.count as f64 * ys.count as f64;
        if total > MAX_SCAN_SAMPLES as f64 {
            return Err(CamError::InvalidParameters(format!(
                "stepover {} over {:.3} x {:.3} needs {:.0} samples, limit is {}",
                step, extent_x, extent_y, total, MAX_SCAN_SAMPLES
            )));
        }
        let (outer, inner) = match self {
            ScanStrategy::Raster => (xs, ys),
            ScanStrategy::Crosshatch => (ys, xs),
        };
        Ok(ScanPath {
            strategy: self,
            outer,
            inner,
            outer_i: 0,
            inner_i: 0,
        })
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raster => write!(f, "raster"),
            Self::Crosshatch => write!(f, "crosshatch"),
        }
    }
}

impl FromStr for ScanStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raster" => Ok(Self::Raster),
            "crosshatch" | "cross" => Ok(Self::Crosshatch),
            _ => Err(format!("Unknown scan strategy: {}", s)),
        }
    }
}

/// Upper bound on the samples of a single pass
pub const MAX_SCAN_SAMPLES: u64 = 1 << 31;

/// Evenly stepped positions along one axis, ending exactly on `extent`
#[derive(Debug, Clone, Copy)]
struct Axis {
    extent: f64,
    step: f64,
    count: usize,
}

impl Axis {
    fn new(extent: f64, step: f64) -> CamResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(CamError::InvalidParameters(format!(
                "scan step must be finite and positive, got {}",
                step
            )));
        }
        if !extent.is_finite() {
            return Err(CamError::InvalidParameters(format!(
                "scan extent must be finite, got {}",
                extent
            )));
        }
        let extent = extent.max(0.0);
        let interior = ((extent / step) - STEP_SLACK).ceil().max(0.0);
        if interior >= MAX_SCAN_SAMPLES as f64 {
            return Err(CamError::InvalidParameters(format!(
                "stepover {} is too fine for an extent of {:.3}",
                step, extent
            )));
        }
        Ok(Self {
            extent,
            step,
            count: interior as usize + 1,
        })
    }

    fn position(&self, k: usize) -> f64 {
        if k + 1 == self.count {
            self.extent
        } else {
            k as f64 * self.step
        }
    }
}

/// Sample positions along one axis: `0, step, 2 * step, ...` below `extent`,
/// then `extent` itself so the far edge is always covered.
///
/// Yields `ceil(extent / step) + 1` positions.
pub fn axis_positions(extent: f64, step: f64) -> CamResult<Vec<f64>> {
    let axis = Axis::new(extent, step)?;
    Ok((0..axis.count).map(|k| axis.position(k)).collect())
}

/// Iterator over the `(x, y)` samples of one scan pass
#[derive(Debug, Clone)]
pub struct ScanPath {
    strategy: ScanStrategy,
    outer: Axis,
    inner: Axis,
    outer_i: usize,
    inner_i: usize,
}

impl ScanPath {
    /// Number of sweeps (columns for raster, rows for crosshatch)
    pub fn sweeps(&self) -> usize {
        self.outer.count
    }

    /// Samples per sweep
    pub fn samples_per_sweep(&self) -> usize {
        self.inner.count
    }
}

impl Iterator for ScanPath {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.outer_i >= self.outer.count {
            return None;
        }
        let fixed = self.outer.position(self.outer_i);
        // Odd sweeps run backwards so there is no traverse between them.
        let k = if self.outer_i % 2 == 0 {
            self.inner_i
        } else {
            self.inner.count - 1 - self.inner_i
        };
        let along = self.inner.position(k);

        self.inner_i += 1;
        if self.inner_i == self.inner.count {
            self.inner_i = 0;
            self.outer_i += 1;
        }

        Some(match self.strategy {
            ScanStrategy::Raster => (fixed, along),
            ScanStrategy::Crosshatch => (along, fixed),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let done = self.outer_i * self.inner.count + self.inner_i;
        let remaining = self.outer.count * self.inner.count - done;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScanPath {}
