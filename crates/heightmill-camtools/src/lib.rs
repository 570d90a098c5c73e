//! # Heightmill CAM Tools
//!
//! Toolpath synthesis for carving grayscale heightmaps with a ball-nose
//! cutter or a depth-modulated laser.
//!
//! ## Pipeline
//!
//! - **Decoder**: 8-bit and 16-bit grayscale images to heightmaps
//! - **Scan**: raster and crosshatch boustrophedon sample sequences
//! - **Simulator**: ball-nose contact height at any point over the surface
//! - **Simplifier**: online merging of near-collinear waypoints
//! - **Toolpath**: drives the stages above into a motion sink
//! - **G-code**: laser and router dialect output

pub mod decoder;
pub mod error;
pub mod gcode;
pub mod scan;
pub mod simplifier;
pub mod simulator;
pub mod toolpath;

// Re-export commonly used items
pub use decoder::{DepthMapping, HeightmapDecoder};
pub use error::{CamError, CamResult};
pub use gcode::{Dialect, GcodeOptions, GcodeWriter};
pub use scan::{axis_positions, ScanPath, ScanStrategy, MAX_SCAN_SAMPLES};
pub use simplifier::{MotionSimplifier, Pending};
pub use simulator::{height_at, EngagementSimulator, CONTACT_FLOOR};
pub use toolpath::{MotionCommand, MotionSink, ToolpathGenerator, ToolpathParameters};
