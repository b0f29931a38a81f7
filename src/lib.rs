//! Single-precision GEMM and dot product for 4-lane SIMD, built from scratch.
//!
//! Two primitives, each with a slow oracle and a fast path:
//!
//! - matrix multiply: [`gemm_ref`] (triple loop) and [`gemm_optimized`]
//!   (cache blocking, packed panels, a 4×4 microkernel, column panels
//!   spread over threads)
//! - dot product: [`dot_naive`] and [`dot_optimized`] (four vector
//!   accumulators, tail handling)
//!
//! The instruction set is picked at runtime (NEON, SSE+FMA, SSE2, or a
//! portable fallback) and can be forced through [`GemmConfig`].
//!
//! ## Usage
//!
//! ```
//! use lanemath::{gemm_optimized, gemm_ref};
//!
//! let a = vec![1.0f32; 64 * 64];
//! let b = vec![1.0f32; 64 * 64];
//! let mut c = vec![0.0f32; 64 * 64];
//!
//! gemm_optimized(64, 64, 64, &a, &b, &mut c).unwrap();
//! assert!(c.iter().all(|&x| x == 64.0));
//! ```
//!
//! ```
//! use lanemath::{dot_naive, dot_optimized};
//!
//! let a = [1.0, 1.0, 1.0, 1.0];
//! let b = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(dot_naive(&a, &b).unwrap(), 10.0);
//! assert_eq!(dot_optimized(&a, &b).unwrap(), 10.0);
//! ```
//!
//! ## What's inside
//!
//! - 4×4 kernels: scalar, SSE2, SSE+FMA, NEON
//! - A packed once per (row block, depth block), B once per 4-column strip
//! - Edge tiles through a scratch tile, so any M, N, K works
//! - Column panels split over a rayon scope, no locks

pub mod blocked;
pub mod buffer;
pub mod config;
pub mod dot;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod simd;
pub mod threaded;
pub mod vector;

pub use buffer::{AlignedBuffer, allocate, deallocate};
pub use config::{BlockConfig, GemmConfig};
pub use dot::dot_optimized;
pub use dot::naive::dot_naive;
pub use error::{KernelError, Result};
pub use matrix::reference::gemm_ref;
pub use simd::Backend;

/// Matrix multiply: C = A * B
///
/// Uses the default [`GemmConfig`] (detected backend, default block sizes,
/// all rayon threads). Matrices are row-major: A is m×k, B is k×n, C is
/// m×n. C is overwritten; its previous contents don't matter.
///
/// # Errors
///
/// [`KernelError::Allocation`] if a worker's pack buffers can't be allocated.
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k.
pub fn gemm_optimized(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<()> {
    gemm_with(&GemmConfig::default(), m, n, k, a, b, c)
}

/// Matrix multiply: C += A * B
///
/// Same as [`gemm_optimized`] but adds into the existing contents of C.
pub fn gemm_accumulate(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<()> {
    gemm_accumulate_with(&GemmConfig::default(), m, n, k, a, b, c)
}

/// C = A * B with explicit block sizes, thread cap and backend.
pub fn gemm_with(
    config: &GemmConfig,
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<()> {
    // All three before C is cleared, so a bad A or B leaves C untouched
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    c.fill(0.0);
    gemm_accumulate_with(config, m, n, k, a, b, c)
}

/// C += A * B with explicit block sizes, thread cap and backend.
pub fn gemm_accumulate_with(
    config: &GemmConfig,
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<()> {
    threaded::gemm_4x4_mt::gemm_4x4_mt(config, m, n, k, a, b, c)
}
