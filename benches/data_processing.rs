//! Benchmarks for sample buffer operations
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serialscope::{Sample, SampleBuffer};

fn bench_sample_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_append");

    for capacity in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("append", capacity),
            capacity,
            |b, &capacity| {
                let mut buf = SampleBuffer::new(capacity).unwrap();
                let mut i = 0u64;
                b.iter(|| {
                    let sample = Sample::new(i as f64 * 0.1, (i % 1024) as f64 * 5.0 / 1024.0);
                    buf.append(black_box(sample));
                    i = i.wrapping_add(1);
                });
            },
        );
    }

    group.finish();
}

fn bench_plot_points_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("plot_points_conversion");

    for capacity in [100, 1_000, 10_000].iter() {
        // Pre-fill with data
        let mut buf = SampleBuffer::new(*capacity).unwrap();
        for i in 0..*capacity * 2 {
            buf.append(Sample::new(i as f64 * 0.1, (i % 1024) as f64 * 5.0 / 1024.0));
        }

        group.throughput(Throughput::Elements(*capacity as u64));
        group.bench_with_input(
            BenchmarkId::new("plot_points", capacity),
            &buf,
            |b, buf| {
                b.iter(|| black_box(buf.plot_points()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sample_append, bench_plot_points_conversion);
criterion_main!(benches);
