//! Single-precision dot product.
//!
//! - `naive`: one scalar accumulator, the correctness oracle
//! - `unrolled`: four vector accumulators plus tail handling, per backend
//!
//! Both check lengths before touching the data and run on the calling
//! thread.

pub mod naive;
pub mod unrolled;

use crate::error::{KernelError, Result, check_len};
use crate::simd::{self, Backend};
use unrolled::DotKernel;

/// The unrolled dot product for `backend`. Backends that don't exist on
/// this architecture fall back to the scalar version.
pub fn dot_kernel(backend: Backend) -> DotKernel {
    match backend {
        #[cfg(target_arch = "x86_64")]
        Backend::Sse2 => unrolled::dot_unrolled_sse2,
        #[cfg(target_arch = "x86_64")]
        Backend::Fma => unrolled::dot_unrolled_fma,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => unrolled::dot_unrolled_neon,
        _ => unrolled::dot_unrolled_scalar,
    }
}

/// Dot product on the detected backend.
///
/// # Errors
///
/// [`KernelError::DimensionMismatch`] if the lengths differ.
pub fn dot_optimized(a: &[f32], b: &[f32]) -> Result<f32> {
    dot_optimized_with(simd::backend(), a, b)
}

/// Dot product on an explicit backend.
///
/// # Errors
///
/// [`KernelError::DimensionMismatch`] if the lengths differ,
/// [`KernelError::UnsupportedBackend`] if this CPU can't run `backend`.
pub fn dot_optimized_with(backend: Backend, a: &[f32], b: &[f32]) -> Result<f32> {
    check_len("dot_optimized", a.len(), b.len())?;
    if !backend.is_available() {
        return Err(KernelError::UnsupportedBackend(backend));
    }

    // SAFETY: equal lengths checked, backend available.
    Ok(unsafe { dot_kernel(backend)(a, b) })
}

#[cfg(test)]
mod tests {
    use super::naive::dot_naive;
    use super::*;

    #[test]
    fn test_matches_naive_all_backends() {
        let sizes = [0, 1, 3, 4, 8, 15, 16, 17, 32, 63, 64, 65, 1024, 100_003];

        for backend in Backend::available() {
            for &size in &sizes {
                let a = vec![1.0f32; size];
                let b: Vec<f32> = (0..size).map(|i| (i % 5) as f32).collect();

                let naive = dot_naive(&a, &b).unwrap();
                let optimized = dot_optimized_with(backend, &a, &b).unwrap();
                assert!(
                    (naive - optimized).abs() < 1e-4,
                    "{} size {}: naive {}, optimized {}",
                    backend,
                    size,
                    naive,
                    optimized
                );
            }
        }
    }

    #[test]
    fn test_mismatch() {
        assert_eq!(
            dot_optimized(&[1.0; 5], &[1.0; 4]),
            Err(KernelError::DimensionMismatch {
                op: "dot_optimized",
                left: 5,
                right: 4
            })
        );
    }

    #[test]
    fn test_unsupported_backend() {
        #[cfg(target_arch = "x86_64")]
        assert_eq!(
            dot_optimized_with(Backend::Neon, &[1.0], &[1.0]),
            Err(KernelError::UnsupportedBackend(Backend::Neon))
        );
        #[cfg(target_arch = "aarch64")]
        assert_eq!(
            dot_optimized_with(Backend::Sse2, &[1.0], &[1.0]),
            Err(KernelError::UnsupportedBackend(Backend::Sse2))
        );
    }
}
