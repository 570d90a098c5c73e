//! Cutting tool geometry
//!
//! Only ball-nose tools are modelled: the tip is a sphere described by its
//! radius. A laser spot is treated the same way.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ball-nose tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tip radius in machine units
    pub radius: f64,
}

impl Tool {
    /// Create a tool from its tip radius
    pub fn new(radius: f64) -> Self {
        debug_assert!(
            radius.is_finite() && radius >= 0.0,
            "tool radius must be finite and non-negative: {radius}"
        );
        Self { radius }
    }

    /// Create a tool from its diameter
    pub fn from_diameter(diameter: f64) -> Self {
        Self::new(diameter / 2.0)
    }

    /// Tool diameter
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ball nose {:.3} dia", self.diameter())
    }
}
