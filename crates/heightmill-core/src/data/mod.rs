//! Data models for heightmaps, tools and machine positions
//!
//! This module provides:
//! - The immutable heightmap grid produced by the image decoder
//! - Ball-nose tool geometry
//! - 3-axis points with the vector arithmetic the path simplifier needs

pub mod heightmap;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3-axis machine position, also used as a displacement vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point3 {
    /// Create a point from its coordinates
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sum
    pub fn add(&self, other: &Point3) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &Point3) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Multiply every component by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point3) -> f64 {
        self.sub(other).length()
    }

    /// True when every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}
