//! Heightmill Settings Crate
//!
//! Handles run configuration: defaults, file loading and saving, and
//! validation before any input is read.

pub mod config;
pub mod error;

pub use config::{Config, ImageSettings, MachineSettings, ToolSettings};
pub use error::{SettingsError, SettingsResult};
