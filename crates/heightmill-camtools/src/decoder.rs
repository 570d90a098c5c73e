//! Heightmap decoder
//!
//! Turns 8-bit or 16-bit grayscale images (PNG, PGM and the other formats the
//! `image` crate recognises) into a [`Heightmap`] with one sample per pixel.

use crate::error::{CamError, CamResult};
use heightmill_core::Heightmap;
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Direction of the linear grey-to-depth mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthMapping {
    /// Black is `-depth_scale`, white is just below the surface
    #[default]
    BlackIsDeep,
    /// White is just above `-depth_scale`, black is the surface
    WhiteIsDeep,
}

impl DepthMapping {
    /// Height of a raw sample whose format maximum is `max`
    pub fn height(self, raw: f64, max: f64, depth_scale: f64) -> f64 {
        let level = raw / (max + 1.0);
        match self {
            Self::BlackIsDeep => (level - 1.0) * depth_scale,
            Self::WhiteIsDeep => -level * depth_scale,
        }
    }
}

impl fmt::Display for DepthMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlackIsDeep => write!(f, "black-is-deep"),
            Self::WhiteIsDeep => write!(f, "white-is-deep"),
        }
    }
}

impl FromStr for DepthMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "black-is-deep" | "black" => Ok(Self::BlackIsDeep),
            "white-is-deep" | "white" => Ok(Self::WhiteIsDeep),
            _ => Err(format!("Unknown depth mapping: {}", s)),
        }
    }
}

/// Grayscale image to heightmap converter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightmapDecoder {
    /// Depth of the darkest (or brightest) level in machine units
    pub depth_scale: f64,
    pub mapping: DepthMapping,
}

impl Default for HeightmapDecoder {
    fn default() -> Self {
        Self {
            depth_scale: 255.0,
            mapping: DepthMapping::BlackIsDeep,
        }
    }
}

impl HeightmapDecoder {
    pub fn new(depth_scale: f64, mapping: DepthMapping) -> Self {
        Self {
            depth_scale,
            mapping,
        }
    }

    /// Decode an image file, guessing the format from its contents
    pub fn decode_file(&self, path: impl AsRef<Path>) -> CamResult<Heightmap> {
        let path = path.as_ref();
        debug!("Decoding heightmap from {}", path.display());
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        self.decode_image(&image)
    }

    /// Decode an image from a stream such as stdin
    pub fn decode_reader<R: Read>(&self, mut reader: R) -> CamResult<Heightmap> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!("Decoding heightmap from {} byte stream", bytes.len());
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?;
        self.decode_image(&image)
    }

    /// Map an already decoded image to heights
    pub fn decode_image(&self, image: &DynamicImage) -> CamResult<Heightmap> {
        let (width, height, data) = match image {
            DynamicImage::ImageLuma8(gray) => {
                let max = f64::from(u8::MAX);
                let data = gray
                    .pixels()
                    .map(|p| self.mapping.height(f64::from(p.0[0]), max, self.depth_scale))
                    .collect();
                (gray.width(), gray.height(), data)
            }
            DynamicImage::ImageLuma16(gray) => {
                let max = f64::from(u16::MAX);
                let data = gray
                    .pixels()
                    .map(|p| self.mapping.height(f64::from(p.0[0]), max, self.depth_scale))
                    .collect();
                (gray.width(), gray.height(), data)
            }
            other => {
                return Err(CamError::UnsupportedBitDepth(format!("{:?}", other.color())));
            }
        };

        debug!("Image size {}x{}, mapping {}", width, height, self.mapping);
        Ok(Heightmap::new(width as usize, height as usize, 1.0, data)?)
    }
}
