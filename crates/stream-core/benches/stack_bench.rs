use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stream_core::{area_path, stack, AreaPoint, Dataset, Row, StackOffset};

fn build_dataset(rows: usize, series: usize) -> Dataset {
    let keys = (0..series).map(|i| format!("s{i}")).collect();
    let rows = (0..rows)
        .map(|j| {
            let values = (0..series)
                .map(|i| 50.0 + 40.0 * ((j as f64 * 0.05) + i as f64).sin())
                .collect();
            Row::new(j as f64 * 86_400_000.0, values)
        })
        .collect();
    Dataset::new(keys, rows)
}

fn bench_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack");
    for &n in &[365usize, 10_000usize] {
        let ds = build_dataset(n, 5);
        for offset in [StackOffset::None, StackOffset::Wiggle] {
            group.bench_function(format!("{offset:?}_{n}"), |b| {
                b.iter(|| black_box(stack(black_box(&ds), offset)))
            });
        }
    }
    group.finish();
}

fn bench_area(c: &mut Criterion) {
    let ds = build_dataset(10_000, 5);
    let stacked = stack(&ds, StackOffset::Wiggle);
    let points: Vec<AreaPoint> = stacked[2]
        .bands
        .iter()
        .enumerate()
        .map(|(i, b)| AreaPoint { x: i as f64 * 0.05, y0: b.lower, y1: b.upper })
        .collect();
    c.bench_function("area_path_10000", |b| b.iter(|| black_box(area_path(black_box(&points), 0.0))));
}

criterion_group!(benches, bench_stack, bench_area);
criterion_main!(benches);
