//! G-code output
//!
//! [`GcodeWriter`] is a [`MotionSink`] that streams motion to any
//! `std::io::Write`. Two dialects are supported:
//! - **Laser**: depth is encoded as spindle power on every `G1`, the way
//!   grayscale laser engravers expect it.
//! - **Router**: depth is a real Z move of the ball tip.

use crate::error::CamResult;
use crate::toolpath::MotionSink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Output flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Laser,
    Router,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Laser => write!(f, "laser"),
            Self::Router => write!(f, "router"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "laser" => Ok(Self::Laser),
            "router" | "mill" => Ok(Self::Router),
            _ => Err(format!("Unknown G-code dialect: {}", s)),
        }
    }
}

/// Writer settings
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeOptions {
    pub dialect: Dialect,
    /// Feed rate (mm/min)
    pub feed_rate: f64,
    /// Ball radius, used to turn centre heights into tip heights
    pub tool_radius: f64,
    /// Stamp the header with the generation time
    pub timestamp: bool,
}

impl Default for GcodeOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Laser,
            feed_rate: 1000.0,
            tool_radius: 0.1,
            timestamp: true,
        }
    }
}

/// Streaming G-code emitter
///
/// Sink methods cannot fail, so the first I/O error is kept and every later
/// write is skipped. [`GcodeWriter::finish`] reports it.
pub struct GcodeWriter<W: Write> {
    out: W,
    options: GcodeOptions,
    lines: usize,
    error: Option<io::Error>,
}

impl<W: Write> GcodeWriter<W> {
    pub fn new(out: W, options: GcodeOptions) -> Self {
        Self {
            out,
            options,
            lines: 0,
            error: None,
        }
    }

    /// Lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Comment block and modal setup
    ///
    /// `summary` lines are written as comments after the title.
    pub fn write_header(&mut self, summary: &[String]) {
        self.line("; Heightmill toolpath".to_string());
        if self.options.timestamp {
            self.line(format!(
                "; Generated: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        self.line(format!("; Dialect: {}", self.options.dialect));
        self.line(format!("; Feed rate: {:.0} mm/min", self.options.feed_rate));
        for entry in summary {
            self.line(format!("; {}", entry));
        }
        self.line(";".to_string());
        self.line("G21 ; Set units to millimeters".to_string());
        self.line("G90 ; Absolute positioning".to_string());
    }

    /// Write the footer, flush, and hand back the output
    pub fn finish(mut self) -> CamResult<W> {
        self.line("M2 ; End program".to_string());
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn tip(&self, z: f64) -> f64 {
        z - self.options.tool_radius
    }

    fn line(&mut self, text: String) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{}", text) {
            Ok(()) => self.lines += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

impl<W: Write> MotionSink for GcodeWriter<W> {
    fn rapid(&mut self, x: f64, y: f64, z: f64) {
        if self.options.dialect == Dialect::Router {
            self.line(format!("G0 Z{:.3}", self.tip(z)));
        }
        self.line(format!("G0 X{:.2} Y{:.2}", x, y));
        if self.options.dialect == Dialect::Laser {
            self.line("M3 S0".to_string());
        }
        self.line(format!("F{:.0}", self.options.feed_rate));
    }

    fn cut(&mut self, x: f64, y: f64, z: f64) {
        let text = match self.options.dialect {
            Dialect::Laser => format!("G1 X{:.2} Y{:.2} S{:.0}", x, y, -z),
            Dialect::Router => format!("G1 X{:.2} Y{:.2} Z{:.3}", x, y, self.tip(z)),
        };
        self.line(text);
    }

    fn retract(&mut self, z: f64) {
        match self.options.dialect {
            Dialect::Laser => self.line("M5".to_string()),
            Dialect::Router => {
                let text = format!("G0 Z{:.3}", self.tip(z));
                self.line(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dialect: Dialect) -> GcodeOptions {
        GcodeOptions {
            dialect,
            feed_rate: 1000.0,
            tool_radius: 1.0,
            timestamp: false,
        }
    }

    fn render(dialect: Dialect) -> String {
        let mut writer = GcodeWriter::new(Vec::new(), options(dialect));
        writer.rapid(0.0, 0.0, 3.0);
        writer.cut(0.0, 0.0, 1.0);
        writer.cut(3.0, 0.0, 1.25);
        writer.retract(3.0);
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_laser_dialect() {
        let gcode = render(Dialect::Laser);
        assert_eq!(
            gcode,
            "G0 X0.00 Y0.00\nM3 S0\nF1000\nG1 X0.00 Y0.00 S-1\nG1 X3.00 Y0.00 S-1\nM5\nM2 ; End program\n"
        );
    }

    #[test]
    fn test_router_dialect_uses_tip_height() {
        let gcode = render(Dialect::Router);
        assert!(gcode.starts_with("G0 Z2.000\nG0 X0.00 Y0.00\nF1000\n"));
        assert!(gcode.contains("G1 X0.00 Y0.00 Z0.000\n"));
        assert!(gcode.contains("G1 X3.00 Y0.00 Z0.250\n"));
        assert!(gcode.contains("G0 Z2.000\nM2"));
        assert!(!gcode.contains("M3"));
    }

    #[test]
    fn test_header_without_timestamp() {
        let mut writer = GcodeWriter::new(Vec::new(), options(Dialect::Laser));
        writer.write_header(&["Image size: 4x4".to_string()]);
        let lines = writer.lines();
        let gcode = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(gcode.contains("; Image size: 4x4\n"));
        assert!(gcode.contains("G21 ; Set units to millimeters\n"));
        assert!(gcode.contains("G90 ; Absolute positioning\n"));
        assert!(!gcode.contains("Generated"));
        assert_eq!(lines, 7);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_error_is_latched() {
        let mut writer = GcodeWriter::new(FailingWriter, options(Dialect::Laser));
        writer.rapid(0.0, 0.0, 1.0);
        writer.cut(1.0, 1.0, 0.5);
        assert_eq!(writer.lines(), 0);
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("Router".parse::<Dialect>(), Ok(Dialect::Router));
        assert!("plasma".parse::<Dialect>().is_err());
    }
}
