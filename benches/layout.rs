use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use combo_overlay::{compute_layout, ComboSpec, FixedMetrics, LayoutConfig, Rect};
use std::hint::black_box;

struct Fixture {
    keys: Vec<Rect>,
    combos: Vec<ComboSpec>,
    canvas: Rect,
}

fn grid_fixture(cols: usize, rows: usize, combo_count: usize) -> Fixture {
    let size = 50.0;
    let gap = 6.0;
    let mut keys = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            keys.push(Rect::new(
                20.0 + col as f64 * (size + gap),
                20.0 + row as f64 * (size + gap),
                size,
                size,
            ));
        }
    }
    // Pairs chosen to mix short (adjacent) and long (routed) combos.
    let combos = (0..combo_count)
        .map(|i| ComboSpec {
            trigger_keys: vec![i % keys.len(), (i * 7 + 3) % keys.len()],
            output_label: (i % 3 == 0).then(|| format!("output-{i}")),
            combo_label: format!("C{i}"),
        })
        .collect();
    let canvas = Rect::new(
        0.0,
        0.0,
        cols as f64 * (size + gap) + 200.0,
        rows as f64 * (size + gap) + 200.0,
    );
    Fixture {
        keys,
        combos,
        canvas,
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    let metrics = FixedMetrics::default();
    let fixtures = [
        ("grid_60_keys_10_combos", grid_fixture(12, 5, 10)),
        ("grid_200_keys_20_combos", grid_fixture(20, 10, 20)),
    ];
    for (name, fixture) in &fixtures {
        group.bench_with_input(BenchmarkId::from_parameter(name), fixture, |b, fx| {
            b.iter(|| {
                let layout = compute_layout(
                    black_box(&fx.keys),
                    black_box(&fx.combos),
                    fx.canvas,
                    &metrics,
                    &config,
                );
                black_box(layout.placements.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
