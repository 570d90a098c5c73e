//! Configuration for Heightmill runs
//!
//! Provides configuration file handling, defaults and validation.
//! Supports JSON and TOML file formats; the default location is
//! platform-specific.
//!
//! Configuration is organized into logical sections:
//! - Tool settings (ball diameter, stepover, simplifier tolerance)
//! - Image settings (depth scale, sampling resolution, grey mapping)
//! - Machine settings (clearance, feed rate, G-code dialect)

use crate::error::{SettingsError, SettingsResult};
use heightmill_camtools::{
    DepthMapping, Dialect, GcodeOptions, HeightmapDecoder, ScanStrategy, ToolpathParameters,
};
use heightmill_core::Tool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cutter and path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Ball diameter in mm
    pub diameter: f64,
    /// Spacing between sweeps and between samples in mm
    pub stepover: f64,
    /// Largest deviation a merged waypoint may have from its segment, in mm
    pub max_error: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            diameter: 0.2,
            stepover: 0.2,
            max_error: 0.001,
        }
    }
}

/// Heightmap decoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Depth of the full grey range in mm
    pub depth_scale: f64,
    /// Physical size of one pixel in mm
    pub resolution: f64,
    /// Which end of the grey range is deep
    pub mapping: DepthMapping,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            depth_scale: 255.0,
            resolution: 0.2,
            mapping: DepthMapping::BlackIsDeep,
        }
    }
}

/// Machine output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Tip height for rapids and retracts in mm
    pub clearance: f64,
    /// Cutting feed rate in mm/min
    pub feed_rate: f64,
    pub dialect: Dialect,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            feed_rate: 1000.0,
            dialect: Dialect::Laser,
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Passes to run, in order
    pub strategies: Vec<ScanStrategy>,
    /// Debug logging
    pub verbose: bool,
    pub tool: ToolSettings,
    pub image: ImageSettings,
    pub machine: MachineSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategies: vec![ScanStrategy::Crosshatch],
            verbose: false,
            tool: ToolSettings::default(),
            image: ImageSettings::default(),
            machine: MachineSettings::default(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, `<config dir>/heightmill/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("heightmill").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    ///
    /// Missing keys take their defaults. The result is validated.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Self::read_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it
    ///
    /// For callers that layer further overrides on top and validate the
    /// merged result themselves.
    pub fn read_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let numeric = [
            ("tool.diameter", self.tool.diameter),
            ("tool.stepover", self.tool.stepover),
            ("tool.max_error", self.tool.max_error),
            ("image.depth_scale", self.image.depth_scale),
            ("image.resolution", self.image.resolution),
            ("machine.clearance", self.machine.clearance),
            ("machine.feed_rate", self.machine.feed_rate),
        ];
        for (key, value) in numeric {
            if !value.is_finite() {
                return Err(SettingsError::invalid(key, "must be finite"));
            }
            if value < 0.0 {
                return Err(SettingsError::invalid(key, "must not be negative"));
            }
        }

        if self.tool.stepover == 0.0 {
            return Err(SettingsError::invalid("tool.stepover", "must be > 0"));
        }
        if self.image.resolution == 0.0 {
            return Err(SettingsError::invalid("image.resolution", "must be > 0"));
        }
        if self.strategies.is_empty() {
            return Err(SettingsError::invalid(
                "strategies",
                "at least one scan strategy is required",
            ));
        }

        Ok(())
    }

    /// Toolpath parameters for the configured tool
    pub fn toolpath_parameters(&self) -> ToolpathParameters {
        ToolpathParameters {
            tool: Tool::from_diameter(self.tool.diameter),
            stepover: self.tool.stepover,
            max_error: self.tool.max_error,
            clearance: self.machine.clearance,
        }
    }

    /// Image decoder for the configured depth mapping
    pub fn decoder(&self) -> HeightmapDecoder {
        HeightmapDecoder::new(self.image.depth_scale, self.image.mapping)
    }

    /// G-code writer options
    pub fn gcode_options(&self) -> GcodeOptions {
        GcodeOptions {
            dialect: self.machine.dialect,
            feed_rate: self.machine.feed_rate,
            tool_radius: self.tool.diameter / 2.0,
            timestamp: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategies, vec![ScanStrategy::Crosshatch]);
        assert_eq!(config.machine.dialect, Dialect::Laser);
        assert_eq!(config.toolpath_parameters().tool.radius, 0.1);
    }

    #[test]
    fn test_validate_rejects_zero_stepover() {
        let mut config = Config::new();
        config.tool.stepover = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidSetting { ref key, .. } if key == "tool.stepover"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        let mut config = Config::new();
        config.machine.clearance = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.image.depth_scale = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.tool.diameter = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_a_strategy() {
        let mut config = Config::new();
        config.strategies.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            strategies = ["raster", "crosshatch"]

            [machine]
            dialect = "router"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.strategies,
            vec![ScanStrategy::Raster, ScanStrategy::Crosshatch]
        );
        assert_eq!(config.machine.dialect, Dialect::Router);
        assert_eq!(config.machine.feed_rate, 1000.0);
        assert_eq!(config.tool, ToolSettings::default());
    }

    #[test]
    fn test_default_path_file_name() {
        if let Ok(path) = Config::default_path() {
            assert!(path.ends_with("heightmill/config.toml"));
        }
    }
}
