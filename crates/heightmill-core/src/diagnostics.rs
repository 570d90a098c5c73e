//! Run diagnostics
//!
//! Counters reported at the end of a run. One accumulator is owned by the
//! caller and threaded by `&mut` through every pass.

use std::fmt;

/// Counters and the continuity state of the engagement simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Samples resolved with the last-good-height fallback
    pub issues: usize,
    /// Simulated sample points, fallback or not
    pub samples: usize,
    /// Motion commands handed to the sink (rapid, cut and retract)
    pub commands: usize,
    /// Most recent height computed from real contact
    pub last_good_height: f64,
}

impl Diagnostics {
    /// Fresh accumulator with the fallback height seeded at zero
    pub fn new() -> Self {
        Self {
            issues: 0,
            samples: 0,
            commands: 0,
            last_good_height: 0.0,
        }
    }

    /// Record a sample with real contact
    pub fn record_contact(&mut self, height: f64) {
        self.samples += 1;
        self.last_good_height = height;
    }

    /// Record a sample with no contact and return the fallback height
    pub fn record_fallback(&mut self) -> f64 {
        self.samples += 1;
        self.issues += 1;
        self.last_good_height
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &Diagnostics) {
        self.issues += other.issues;
        self.samples += other.samples;
        self.commands += other.commands;
        self.last_good_height = other.last_good_height;
    }

    /// Samples per emitted command; higher means better simplification
    pub fn compression_ratio(&self) -> f64 {
        if self.commands == 0 {
            0.0
        } else {
            self.samples as f64 / self.commands as f64
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Issues: {}\nnc lines: {}", self.issues, self.samples)
    }
}
