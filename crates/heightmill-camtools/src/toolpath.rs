//! Heightmap toolpath pipeline
//!
//! Drives one or more scan passes through the engagement simulator and the
//! motion simplifier, and hands the surviving motion to a [`MotionSink`].

use crate::error::{CamError, CamResult};
use crate::scan::{ScanPath, ScanStrategy};
use crate::simplifier::MotionSimplifier;
use crate::simulator::EngagementSimulator;
use heightmill_core::{Diagnostics, Heightmap, Point3, Tool};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single machine motion
///
/// `z` is always the height of the sphere centre; [`MotionCommand::depth`]
/// gives the sign-inverted value most machines expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Uncontrolled move to a new start point
    Rapid { x: f64, y: f64, z: f64 },
    /// Cutting move at feed rate
    Cut { x: f64, y: f64, z: f64 },
    /// Lift clear of the work at the end of a pass
    Retract { z: f64 },
}

impl MotionCommand {
    /// Sphere-centre height of the move
    pub fn z(&self) -> f64 {
        match *self {
            Self::Rapid { z, .. } | Self::Cut { z, .. } | Self::Retract { z } => z,
        }
    }

    /// Machine depth, the negated height
    pub fn depth(&self) -> f64 {
        -self.z()
    }

    pub fn is_cut(&self) -> bool {
        matches!(self, Self::Cut { .. })
    }
}

/// Consumer of simplified motion
pub trait MotionSink {
    fn rapid(&mut self, x: f64, y: f64, z: f64);
    fn cut(&mut self, x: f64, y: f64, z: f64);
    fn retract(&mut self, z: f64);
}

impl MotionSink for Vec<MotionCommand> {
    fn rapid(&mut self, x: f64, y: f64, z: f64) {
        self.push(MotionCommand::Rapid { x, y, z });
    }

    fn cut(&mut self, x: f64, y: f64, z: f64) {
        self.push(MotionCommand::Cut { x, y, z });
    }

    fn retract(&mut self, z: f64) {
        self.push(MotionCommand::Retract { z });
    }
}

/// Parameters for heightmap toolpath generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolpathParameters {
    /// Ball-nose cutter
    pub tool: Tool,
    /// Distance between adjacent sweeps and between samples along a sweep (mm)
    pub stepover: f64,
    /// Merge tolerance of the simplifier (mm)
    pub max_error: f64,
    /// Tip height above zero for rapids and retracts (mm)
    pub clearance: f64,
}

impl Default for ToolpathParameters {
    fn default() -> Self {
        Self {
            tool: Tool::from_diameter(0.2),
            stepover: 0.2,
            max_error: 0.001,
            clearance: 2.0,
        }
    }
}

impl ToolpathParameters {
    /// Reject parameters that would stall or poison the scan
    pub fn validate(&self) -> CamResult<()> {
        let checks = [
            ("tool radius", self.tool.radius),
            ("stepover", self.stepover),
            ("max error", self.max_error),
            ("clearance", self.clearance),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(CamError::InvalidParameters(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.stepover <= 0.0 {
            return Err(CamError::InvalidParameters(
                "stepover must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Sphere-centre height used for rapids and the final retract
    pub fn safe_height(&self) -> f64 {
        self.clearance + self.tool.radius
    }
}

/// Generator for heightmap surfacing passes
pub struct ToolpathGenerator<'a> {
    heightmap: &'a Heightmap,
    params: ToolpathParameters,
}

impl<'a> ToolpathGenerator<'a> {
    pub fn new(heightmap: &'a Heightmap, params: ToolpathParameters) -> Self {
        Self { heightmap, params }
    }

    /// Run one scan pass into `sink`
    ///
    /// Emits one rapid to the first sample, the simplified cuts, then one
    /// retract. Every sample is counted in `diagnostics`.
    pub fn generate<S: MotionSink + ?Sized>(
        &self,
        strategy: ScanStrategy,
        sink: &mut S,
        diagnostics: &mut Diagnostics,
    ) -> CamResult<()> {
        self.generate_passes(&[strategy], sink, diagnostics)
    }

    /// Run several passes back to back, e.g. raster then crosshatch
    ///
    /// Every pass is checked before any motion is emitted.
    pub fn generate_passes<S: MotionSink + ?Sized>(
        &self,
        strategies: &[ScanStrategy],
        sink: &mut S,
        diagnostics: &mut Diagnostics,
    ) -> CamResult<()> {
        self.params.validate()?;
        let (extent_x, extent_y) = self.heightmap.extent();
        let paths = strategies
            .iter()
            .map(|&strategy| strategy.path(extent_x, extent_y, self.params.stepover))
            .collect::<CamResult<Vec<ScanPath>>>()?;

        let safe = self.params.safe_height();
        let mut simplifier =
            MotionSimplifier::new(Point3::new(0.0, 0.0, safe), self.params.max_error);

        for (&strategy, path) in strategies.iter().zip(paths) {
            // The fallback height carries over from the previous pass.
            let mut pass = Diagnostics {
                last_good_height: diagnostics.last_good_height,
                ..Diagnostics::new()
            };
            self.run_pass(strategy, path, &mut simplifier, sink, &mut pass);
            debug!(
                "Finished {} pass: {} samples, {} commands, {} issues",
                strategy, pass.samples, pass.commands, pass.issues
            );
            diagnostics.merge(&pass);
        }
        Ok(())
    }

    fn run_pass<S: MotionSink + ?Sized>(
        &self,
        strategy: ScanStrategy,
        path: ScanPath,
        simplifier: &mut MotionSimplifier,
        sink: &mut S,
        diagnostics: &mut Diagnostics,
    ) {
        debug!(
            "Starting {} pass: {} sweeps x {} samples, stepover {:.3}",
            strategy,
            path.sweeps(),
            path.samples_per_sweep(),
            self.params.stepover
        );

        let simulator = EngagementSimulator::new(self.heightmap, self.params.tool);
        let safe = self.params.safe_height();
        let mut path = path.peekable();
        let Some(&(x0, y0)) = path.peek() else {
            return;
        };

        // The first sample after a reposition is a straight plunge.
        if let Some(flushed) = simplifier.reposition(Point3::new(x0, y0, safe)) {
            sink.cut(flushed.x, flushed.y, flushed.z);
            diagnostics.commands += 1;
        }
        sink.rapid(x0, y0, safe);
        diagnostics.commands += 1;

        for (x, y) in path {
            let z = simulator.height_at(x, y, diagnostics);
            if let Some(commit) = simplifier.accept(Point3::new(x, y, z)) {
                sink.cut(commit.x, commit.y, commit.z);
                diagnostics.commands += 1;
            }
        }

        if let Some(commit) = simplifier.finish() {
            sink.cut(commit.x, commit.y, commit.z);
            diagnostics.commands += 1;
        }
        sink.retract(safe);
        diagnostics.commands += 1;
    }
}
