use criterion::{black_box, criterion_group, criterion_main, Criterion};
use heightmill_camtools::{
    EngagementSimulator, MotionCommand, ScanStrategy, ToolpathGenerator, ToolpathParameters,
};
use heightmill_core::{Diagnostics, Heightmap, Tool};

fn dome(size: usize, res: f64) -> Heightmap {
    let c = (size as f64 - 1.0) / 2.0;
    let data = (0..size * size)
        .map(|i| {
            let dx = (i % size) as f64 - c;
            let dy = (i / size) as f64 - c;
            -((dx * dx + dy * dy).sqrt() / c).min(1.0) * 10.0
        })
        .collect();
    Heightmap::new(size, size, res, data).unwrap()
}

fn bench_contact_height(c: &mut Criterion) {
    let map = dome(256, 0.1);
    let sim = EngagementSimulator::new(&map, Tool::from_diameter(1.0));

    c.bench_function("contact_height_r0.5", |b| {
        b.iter(|| sim.contact_height(black_box(12.3), black_box(7.9)))
    });
}

fn bench_toolpath(c: &mut Criterion) {
    let map = dome(128, 0.2);
    let params = ToolpathParameters {
        tool: Tool::from_diameter(0.6),
        stepover: 0.2,
        max_error: 0.001,
        clearance: 2.0,
    };
    let generator = ToolpathGenerator::new(&map, params);

    let mut group = c.benchmark_group("toolpath");
    for strategy in [ScanStrategy::Raster, ScanStrategy::Crosshatch] {
        group.bench_function(strategy.to_string(), |b| {
            b.iter(|| {
                let mut commands: Vec<MotionCommand> = Vec::new();
                let mut diag = Diagnostics::new();
                generator
                    .generate(strategy, &mut commands, &mut diag)
                    .unwrap();
                black_box(commands.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contact_height, bench_toolpath);
criterion_main!(benches);
