//! # Heightmill
//!
//! Converts grayscale heightmaps into toolpaths for a ball-nose cutter or a
//! depth-modulated laser.
//!
//! ## Architecture
//!
//! Heightmill is organized as a workspace with multiple crates:
//!
//! 1. **heightmill-core** - Heightmap grid, tool geometry, points, diagnostics
//! 2. **heightmill-camtools** - Decoder, scan strategies, engagement simulator,
//!    motion simplifier, toolpath pipeline and G-code writer
//! 3. **heightmill-settings** - Configuration files, defaults and validation
//! 4. **heightmill** - Command line binary that ties the crates together

pub mod cli;

pub use heightmill_camtools::{
    CamError, DepthMapping, Dialect, HeightmapDecoder, MotionCommand, MotionSink, ScanStrategy,
    ToolpathGenerator, ToolpathParameters,
};
pub use heightmill_core::{Diagnostics, Heightmap, Point3, Tool};
pub use heightmill_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so G-code on stdout stays clean
/// - RUST_LOG environment variable support
/// - `warn` by default, `debug` when verbose
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
