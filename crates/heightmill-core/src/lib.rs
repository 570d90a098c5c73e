//! # Heightmill Core
//!
//! Core data model for Heightmill.
//! Provides the heightmap grid, tool geometry, machine points and the
//! diagnostics accumulator shared by every toolpath pass.

pub mod data;
pub mod diagnostics;
pub mod error;

pub use data::{heightmap::Heightmap, tools::Tool, Point3};
pub use diagnostics::Diagnostics;
pub use error::{CoreError, CoreResult};
