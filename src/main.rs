//! Benchmark runner for the GEMM and dot product implementations.
//!
//! `RUST_LOG=lanemath=debug` shows backend detection and thread splits.
//! Block sizes, threads and backend can be overridden with the
//! `LANEMATH_*` environment variables (see `GemmConfig::from_env`).

use lanemath::{
    Backend, GemmConfig, dot::dot_optimized_with, dot_naive, gemm_ref, gemm_with,
};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    env_logger::init();

    let config = match GemmConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Matrix Multiplication Benchmark ===\n");
    println!(
        "Backend: {}  (available: {})",
        config.backend(),
        Backend::available()
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Blocks: mc={} kc={} nc={}  Threads: {}\n",
        config.blocks().mc(),
        config.blocks().kc(),
        config.blocks().nc(),
        config.threads()
    );

    if let Err(err) = bench_gemm(&config) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = bench_dot(config.backend()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn bench_gemm(config: &GemmConfig) -> lanemath::Result<()> {
    let sizes = [128, 256, 512];
    let iterations = 3;

    println!("{:<10} {:>12} {:>10} {:>12} {:>10} {:>9}", "Size", "Ref ms", "GFLOPS", "Opt ms", "GFLOPS", "Speedup");
    println!("{}", "-".repeat(68));

    for &size in &sizes {
        let (m, n, k) = (size, size, size);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 100) as f32 * 0.01).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 100) as f32 * 0.01).collect();
        let mut c = vec![0.0f32; m * n];

        let ref_ms = time_ms(iterations, || {
            gemm_ref(m, n, k, &a, &b, &mut c);
            Ok(())
        })?;
        let opt_ms = time_ms(iterations * 5, || gemm_with(config, m, n, k, &a, &b, &mut c))?;

        let flops = 2.0 * (m * n * k) as f64;
        println!(
            "{:<10} {:>12.2} {:>10.2} {:>12.2} {:>10.2} {:>8.1}×",
            format!("{}×{}", size, size),
            ref_ms,
            gflops(flops, ref_ms),
            opt_ms,
            gflops(flops, opt_ms),
            ref_ms / opt_ms
        );
    }
    println!();
    Ok(())
}

fn bench_dot(backend: Backend) -> lanemath::Result<()> {
    let n = 1_000_000;
    let iterations = 200;

    let a = vec![1.0f32; n];
    let b = vec![1.0f32; n];

    let naive_ms = time_ms(iterations, || dot_naive(&a, &b).map(drop))?;
    let opt_ms = time_ms(iterations, || dot_optimized_with(backend, &a, &b).map(drop))?;

    let flops = 2.0 * n as f64;
    println!("Dot product (N = {}, {} iterations)", n, iterations);
    println!("{}", "-".repeat(68));
    println!("Naive:    {:8.4} ms/iter | {:6.2} GFLOPS", naive_ms, gflops(flops, naive_ms));
    println!("Unrolled: {:8.4} ms/iter | {:6.2} GFLOPS", opt_ms, gflops(flops, opt_ms));
    println!("Speedup:  {:.1}×\n", naive_ms / opt_ms);
    Ok(())
}

/// Average milliseconds per call, after one warmup call.
fn time_ms<F>(iterations: usize, mut f: F) -> lanemath::Result<f64>
where
    F: FnMut() -> lanemath::Result<()>,
{
    f()?;

    let start = Instant::now();
    for _ in 0..iterations {
        f()?;
    }
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

fn gflops(flops: f64, ms: f64) -> f64 {
    flops / (ms * 1e-3) / 1e9
}
