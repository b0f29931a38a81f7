use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lanemath::dot::dot_optimized_with;
use lanemath::{Backend, GemmConfig, dot_naive, gemm_ref, gemm_with};

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_f32");
    group.sample_size(20);

    for size in [64, 128, 256, 512] {
        let n = size;
        let a: Vec<f32> = (0..n * n).map(|i| ((i % 1000) as f32) * 0.01).collect();
        let b: Vec<f32> = (0..n * n).map(|i| (((i + 500) % 1000) as f32) * 0.01).collect();
        let mut out = vec![0.0f32; n * n];

        group.throughput(Throughput::Elements(2 * (n * n * n) as u64));

        if n <= 256 {
            group.bench_with_input(BenchmarkId::new("reference", n), &n, |bench, &n| {
                bench.iter(|| gemm_ref(n, n, n, black_box(&a), black_box(&b), &mut out));
            });
        }

        for backend in Backend::available() {
            let Ok(config) = GemmConfig::new().with_backend(backend) else {
                continue;
            };
            group.bench_with_input(BenchmarkId::new(backend.name(), n), &n, |bench, &n| {
                bench.iter(|| gemm_with(&config, n, n, n, black_box(&a), black_box(&b), &mut out));
            });
        }

        let single = GemmConfig::new().with_threads(1).unwrap_or_default();
        group.bench_with_input(BenchmarkId::new("single_thread", n), &n, |bench, &n| {
            bench.iter(|| gemm_with(&single, n, n, n, black_box(&a), black_box(&b), &mut out));
        });
    }

    group.finish();
}

fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_f32");

    for len in [1_024, 65_536, 1_000_000] {
        let a: Vec<f32> = (0..len).map(|i| (i % 7) as f32).collect();
        let b: Vec<f32> = (0..len).map(|i| (i % 5) as f32).collect();

        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("naive", len), &len, |bench, _| {
            bench.iter(|| dot_naive(black_box(&a), black_box(&b)));
        });

        for backend in Backend::available() {
            group.bench_with_input(BenchmarkId::new(backend.name(), len), &len, |bench, _| {
                bench.iter(|| dot_optimized_with(backend, black_box(&a), black_box(&b)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_gemm, bench_dot);
criterion_main!(benches);
