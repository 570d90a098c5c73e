//! Command line front end
//!
//! Flags override values from the config file, which override the built-in
//! defaults. Everything that can fail because of bad input fails before the
//! first byte of G-code is written.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use heightmill_camtools::{
    DepthMapping, Dialect, GcodeWriter, HeightmapDecoder, ScanStrategy, ToolpathGenerator,
};
use heightmill_core::{Diagnostics, Heightmap};
use heightmill_settings::Config;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Pass selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    Raster,
    Crosshatch,
    /// Raster followed by crosshatch
    Both,
}

impl StrategyChoice {
    pub fn strategies(self) -> Vec<ScanStrategy> {
        match self {
            Self::Raster => vec![ScanStrategy::Raster],
            Self::Crosshatch => vec![ScanStrategy::Crosshatch],
            Self::Both => vec![ScanStrategy::Raster, ScanStrategy::Crosshatch],
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "heightmill",
    version,
    about = "Convert a grayscale heightmap into a ball-nose G-code toolpath"
)]
pub struct Cli {
    /// Input image (PNG, PGM, ...); reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Tool diameter in mm.
    #[arg(short = 't', long = "toolsize")]
    pub tool_size: Option<f64>,

    /// Stepover between sweeps and samples in mm.
    #[arg(short = 'p', long)]
    pub stepover: Option<f64>,

    /// Depth of the full grey range in mm.
    #[arg(short = 'z', long = "zdepth")]
    pub depth_scale: Option<f64>,

    /// Size of one pixel in mm.
    #[arg(short = 's', long = "scale")]
    pub resolution: Option<f64>,

    /// Clearance height for rapids in mm.
    #[arg(short = 'c', long = "clear")]
    pub clearance: Option<f64>,

    /// Simplifier tolerance in mm.
    #[arg(short = 'e', long)]
    pub max_error: Option<f64>,

    /// Feed rate in mm/min.
    #[arg(long)]
    pub feed: Option<f64>,

    /// Scan passes to run.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyChoice>,

    /// Output dialect: laser or router.
    #[arg(long)]
    pub dialect: Option<Dialect>,

    /// Grey mapping: black-is-deep or white-is-deep.
    #[arg(long)]
    pub mapping: Option<DepthMapping>,

    /// Config file (.toml or .json); the platform default is used if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write G-code here instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Debug logging and extended report.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Use a flat zero heightmap of WIDTHxHEIGHT pixels instead of an image.
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub zero: Option<(usize, usize)>,
}

fn parse_dimensions(s: &str) -> Result<(usize, usize), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

impl Cli {
    /// Copy every flag that was given into `config`
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(v) = self.tool_size {
            config.tool.diameter = v;
        }
        if let Some(v) = self.stepover {
            config.tool.stepover = v;
        }
        if let Some(v) = self.max_error {
            config.tool.max_error = v;
        }
        if let Some(v) = self.depth_scale {
            config.image.depth_scale = v;
        }
        if let Some(v) = self.resolution {
            config.image.resolution = v;
        }
        if let Some(v) = self.mapping {
            config.image.mapping = v;
        }
        if let Some(v) = self.clearance {
            config.machine.clearance = v;
        }
        if let Some(v) = self.feed {
            config.machine.feed_rate = v;
        }
        if let Some(v) = self.dialect {
            config.machine.dialect = v;
        }
        if let Some(choice) = self.strategy {
            config.strategies = choice.strategies();
        }
        config.verbose |= self.verbose;
    }

    /// Effective configuration: file, then flags, then validation
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => match Config::default_path() {
                Ok(path) if path.exists() => Config::read_from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                _ => Config::default(),
            },
        };
        self.apply_overrides(&mut config);
        config.validate().context("Invalid parameters")?;
        Ok(config)
    }

    fn heightmap(&self, config: &Config) -> Result<Heightmap> {
        let resolution = config.image.resolution;
        if let Some((width, height)) = self.zero {
            if width == 0 || height == 0 {
                bail!("--zero dimensions must be positive, got {}x{}", width, height);
            }
            return Ok(Heightmap::zeroed(width, height, resolution)?);
        }

        let decoder: HeightmapDecoder = config.decoder();
        let map = match &self.input {
            Some(path) => decoder
                .decode_file(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?,
            None => decoder
                .decode_reader(io::stdin().lock())
                .context("Failed to read image from stdin")?,
        };
        Ok(map.with_resolution(resolution)?)
    }
}

/// Generate G-code for `heightmap` into `out`
pub fn write_toolpath<W: Write>(
    config: &Config,
    heightmap: &Heightmap,
    out: W,
    diagnostics: &mut Diagnostics,
) -> Result<W> {
    let (extent_x, extent_y) = heightmap.extent();
    let summary = vec![
        format!("Image size: {} x {}", heightmap.width(), heightmap.height()),
        format!("Work area: {:.2} x {:.2} mm", extent_x, extent_y),
        format!(
            "Tool: {}, stepover {:.3} mm",
            config.toolpath_parameters().tool,
            config.tool.stepover
        ),
        format!(
            "Passes: {}",
            config
                .strategies
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ];

    let mut writer = GcodeWriter::new(out, config.gcode_options());
    writer.write_header(&summary);

    let generator = ToolpathGenerator::new(heightmap, config.toolpath_parameters());
    generator.generate_passes(&config.strategies, &mut writer, diagnostics)?;

    debug!("Wrote {} G-code lines", writer.lines());
    let out = writer.finish().context("Failed to write G-code")?;
    Ok(out)
}

/// Full run: read input, write G-code, return the diagnostics
pub fn run(cli: &Cli, config: &Config) -> Result<Diagnostics> {
    let heightmap = cli.heightmap(config)?;
    let (extent_x, extent_y) = heightmap.extent();
    info!("Image size {} x {}", heightmap.width(), heightmap.height());
    info!("Output will be {:.2} x {:.2} mm", extent_x, extent_y);

    let mut diagnostics = Diagnostics::new();
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_toolpath(config, &heightmap, BufWriter::new(file), &mut diagnostics)?;
        }
        None => {
            let stdout = io::stdout().lock();
            write_toolpath(config, &heightmap, BufWriter::new(stdout), &mut diagnostics)?;
        }
    }
    Ok(diagnostics)
}

/// End-of-run summary for stderr
pub fn report(diagnostics: &Diagnostics, verbose: bool) -> String {
    let mut text = diagnostics.to_string();
    if verbose {
        text.push_str(&format!(
            "\nmotion commands: {} ({:.1} samples per command)",
            diagnostics.commands,
            diagnostics.compression_ratio()
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("4x3"), Ok((4, 3)));
        assert_eq!(parse_dimensions("10X2"), Ok((10, 2)));
        assert!(parse_dimensions("4").is_err());
        assert!(parse_dimensions("ax3").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "heightmill",
            "-t",
            "3.0",
            "-p",
            "0.5",
            "--strategy",
            "both",
            "--dialect",
            "router",
            "--mapping",
            "white",
            "-v",
            "in.png",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.tool.diameter, 3.0);
        assert_eq!(config.tool.stepover, 0.5);
        assert_eq!(
            config.strategies,
            vec![ScanStrategy::Raster, ScanStrategy::Crosshatch]
        );
        assert_eq!(config.machine.dialect, Dialect::Router);
        assert_eq!(config.image.mapping, DepthMapping::WhiteIsDeep);
        assert!(config.verbose);
        assert_eq!(cli.input, Some(PathBuf::from("in.png")));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["heightmill"]).unwrap();
        let mut config = Config::default();
        config.machine.feed_rate = 500.0;
        cli.apply_overrides(&mut config);
        assert_eq!(config.machine.feed_rate, 500.0);
        assert_eq!(config.strategies, vec![ScanStrategy::Crosshatch]);
    }

    #[test]
    fn test_report_format() {
        let mut diag = Diagnostics::new();
        diag.record_contact(1.0);
        diag.record_fallback();
        diag.commands = 2;
        assert_eq!(report(&diag, false), "Issues: 1\nnc lines: 2");
        assert!(report(&diag, true).ends_with("motion commands: 2 (1.0 samples per command)"));
    }
}
