//! Heightmap grid
//!
//! An immutable 2D grid of surface heights with a physical sample spacing.
//! Sample `(x, y)` lives at flat index `y * width + x` and its centre sits at
//! `(x * res, y * res)` in machine units.

use crate::error::{CoreError, CoreResult};

/// Immutable grid of height samples
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    res: f64,
    data: Vec<f64>,
}

impl Heightmap {
    /// Create a heightmap from a row-major sample buffer
    ///
    /// # Errors
    /// Fails when a dimension is zero, when `data.len() != width * height`,
    /// or when `res` is not a finite positive number.
    pub fn new(width: usize, height: usize, res: f64, data: Vec<f64>) -> CoreResult<Self> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(CoreError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        check_resolution(res)?;
        Ok(Self {
            width,
            height,
            res,
            data,
        })
    }

    /// Create a flat heightmap with every sample at zero
    ///
    /// A grid too large to allocate is reported as invalid dimensions.
    pub fn zeroed(width: usize, height: usize, res: f64) -> CoreResult<Self> {
        let count = sample_count(width, height)?;
        check_resolution(res)?;
        let mut data = Vec::new();
        data.try_reserve_exact(count)
            .map_err(|_| CoreError::InvalidDimensions { width, height })?;
        data.resize(count, 0.0);
        Self::new(width, height, res, data)
    }

    /// Return a copy of this map with a different sample spacing
    pub fn with_resolution(&self, res: f64) -> CoreResult<Self> {
        check_resolution(res)?;
        Ok(Self {
            res,
            ..self.clone()
        })
    }

    /// Number of samples along X
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along Y
    pub fn height(&self) -> usize {
        self.height
    }

    /// Physical units per sample
    pub fn res(&self) -> f64 {
        self.res
    }

    /// Raw row-major samples
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sample at grid index `(x, y)`, `None` outside the grid
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Physical span covered by the sample centres
    ///
    /// A map of `W` samples spaced `res` apart spans `(W - 1) * res`.
    pub fn extent(&self) -> (f64, f64) {
        (
            (self.width - 1) as f64 * self.res,
            (self.height - 1) as f64 * self.res,
        )
    }

    /// Physical footprint of the whole image (`W * res` by `H * res`)
    pub fn physical_size(&self) -> (f64, f64) {
        (
            self.width as f64 * self.res,
            self.height as f64 * self.res,
        )
    }

    /// Lowest and highest sample
    pub fn height_range(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}

fn sample_count(width: usize, height: usize) -> CoreResult<usize> {
    match width.checked_mul(height) {
        Some(count) if count > 0 => Ok(count),
        _ => Err(CoreError::InvalidDimensions { width, height }),
    }
}

fn check_resolution(res: f64) -> CoreResult<()> {
    if res.is_finite() && res > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidResolution(res))
    }
}
