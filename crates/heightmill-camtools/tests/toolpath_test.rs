use heightmill_camtools::{
    axis_positions, Dialect, GcodeOptions, GcodeWriter, MotionCommand, MotionSink, ScanStrategy,
    ToolpathGenerator, ToolpathParameters,
};
use heightmill_core::{Diagnostics, Heightmap, Tool};

fn flat_params() -> ToolpathParameters {
    ToolpathParameters {
        tool: Tool::new(1.0),
        stepover: 2.0,
        max_error: 0.001,
        clearance: 2.0,
    }
}

#[test]
fn test_flat_4x4_end_to_end() {
    let map = Heightmap::zeroed(4, 4, 1.0).unwrap();
    for strategy in [ScanStrategy::Raster, ScanStrategy::Crosshatch] {
        let generator = ToolpathGenerator::new(&map, flat_params());
        let mut commands: Vec<MotionCommand> = Vec::new();
        let mut diag = Diagnostics::new();
        generator
            .generate(strategy, &mut commands, &mut diag)
            .unwrap();

        let rapids = commands
            .iter()
            .filter(|c| matches!(c, MotionCommand::Rapid { .. }))
            .count();
        let retracts = commands
            .iter()
            .filter(|c| matches!(c, MotionCommand::Retract { .. }))
            .count();
        let cuts: Vec<&MotionCommand> = commands.iter().filter(|c| c.is_cut()).collect();

        assert_eq!(rapids, 1, "{strategy}");
        assert_eq!(retracts, 1, "{strategy}");
        assert!(!cuts.is_empty());
        for cut in cuts {
            assert!((cut.depth() - -1.0).abs() < 1e-9, "{cut:?}");
        }
        assert!(matches!(commands[0], MotionCommand::Rapid { .. }));
        assert!(matches!(commands.last(), Some(MotionCommand::Retract { .. })));
        assert_eq!(diag.issues, 0);
        // Positions 0, 2, 3 on each axis.
        assert_eq!(diag.samples, 9);
    }
}

#[test]
fn test_flat_4x4_laser_gcode() {
    let map = Heightmap::zeroed(4, 4, 1.0).unwrap();
    let generator = ToolpathGenerator::new(&map, flat_params());
    let options = GcodeOptions {
        dialect: Dialect::Laser,
        feed_rate: 1000.0,
        tool_radius: 1.0,
        timestamp: false,
    };
    let mut writer = GcodeWriter::new(Vec::new(), options);
    let mut diag = Diagnostics::new();
    generator
        .generate(ScanStrategy::Crosshatch, &mut writer, &mut diag)
        .unwrap();
    let gcode = String::from_utf8(writer.finish().unwrap()).unwrap();

    assert_eq!(gcode.matches("G0 X").count(), 1);
    assert!(gcode.starts_with("G0 X0.00 Y0.00\nM3 S0\nF1000\n"));
    assert_eq!(gcode.matches("M5").count(), 1);
    for line in gcode.lines().filter(|l| l.starts_with("G1")) {
        assert!(line.ends_with(" S-1"), "{line}");
    }
}

#[test]
fn test_raster_covers_corners() {
    let (x_extent, y_extent, step) = (10.0, 7.0, 3.0);
    let samples: Vec<(f64, f64)> = ScanStrategy::Raster
        .path(x_extent, y_extent, step)
        .unwrap()
        .collect();

    let columns = (x_extent / step).ceil() as usize + 1;
    let rows = axis_positions(y_extent, step).unwrap().len();
    assert_eq!(samples.len(), columns * rows);

    for corner in [(0.0, 0.0), (x_extent, 0.0), (0.0, y_extent), (x_extent, y_extent)] {
        let nearest = samples
            .iter()
            .map(|&(x, y)| ((x - corner.0).powi(2) + (y - corner.1).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min);
        assert!(nearest <= step, "corner {corner:?} is {nearest} away");
    }
    assert!(samples
        .iter()
        .all(|&(x, y)| (0.0..=x_extent).contains(&x) && (0.0..=y_extent).contains(&y)));
}

#[test]
fn test_consecutive_samples_stay_adjacent() {
    // No traverse longer than one step: sweeps reverse instead of jumping back.
    let samples: Vec<(f64, f64)> = ScanStrategy::Crosshatch
        .path(5.0, 5.0, 1.0)
        .unwrap()
        .collect();
    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
        assert!(d <= 1.0 + 1e-9);
    }
}

#[test]
fn test_single_pixel_map() {
    let map = Heightmap::new(1, 1, 1.0, vec![-3.0]).unwrap();
    let generator = ToolpathGenerator::new(&map, flat_params());
    let mut commands: Vec<MotionCommand> = Vec::new();
    let mut diag = Diagnostics::new();
    generator
        .generate(ScanStrategy::Raster, &mut commands, &mut diag)
        .unwrap();

    assert_eq!(
        commands,
        vec![
            MotionCommand::Rapid { x: 0.0, y: 0.0, z: 3.0 },
            MotionCommand::Cut { x: 0.0, y: 0.0, z: -2.0 },
            MotionCommand::Retract { z: 3.0 },
        ]
    );
}

struct Counting(usize);

impl MotionSink for Counting {
    fn rapid(&mut self, _x: f64, _y: f64, _z: f64) {
        self.0 += 1;
    }
    fn cut(&mut self, _x: f64, _y: f64, _z: f64) {
        self.0 += 1;
    }
    fn retract(&mut self, _z: f64) {
        self.0 += 1;
    }
}

#[test]
fn test_diagnostics_count_emitted_commands() {
    let data: Vec<f64> = (0..100).map(|i| -((i % 7) as f64) * 0.3).collect();
    let map = Heightmap::new(10, 10, 0.5, data).unwrap();
    let params = ToolpathParameters {
        tool: Tool::new(0.4),
        stepover: 0.5,
        max_error: 0.01,
        clearance: 1.0,
    };
    let mut sink = Counting(0);
    let mut diag = Diagnostics::new();
    ToolpathGenerator::new(&map, params)
        .generate_passes(
            &[ScanStrategy::Raster, ScanStrategy::Crosshatch],
            &mut sink,
            &mut diag,
        )
        .unwrap();
    assert_eq!(diag.commands, sink.0);
    assert_eq!(diag.samples, 200);
    assert!(diag.commands <= diag.samples + 4);
}
