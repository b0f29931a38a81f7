//! 4×4 microkernel for f32 matrix multiplication.
//!
//! Same contract for every backend: `C[0:4, 0:4] += A_packed × B_packed`.
//! The 4×4 product is built in four vector accumulators (one per row of C)
//! starting from zero, then added into C with a load/add/store. Because the
//! kernel only ever adds, the blocked driver can call it once per depth block
//! on the same tile, and it works the same whether `c` points into the real
//! output (`ldc = n`) or into a 4×4 scratch tile (`ldc = 4`).
//!
//! Every variant has the same pointer contract, listed under `# Safety` on
//! each function.

use crate::config::{MR, NR};

/// Portable version. Four lanes emulated with arrays; the compiler is free
/// to vectorize it.
///
/// # Safety
///
/// Caller must ensure:
/// - `a_pack` points to `k * 4` contiguous f32 values (packed A panel)
/// - `b_pack` points to `k * 4` contiguous f32 values (packed B panel)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 4 f32s
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x4_scalar(
    a_pack: *const f32,
    b_pack: *const f32,
    c: *mut f32,
    k: usize,
    ldc: usize,
) {
    let mut acc = [[0.0f32; NR]; MR];

    for p in 0..k {
        let a = std::slice::from_raw_parts(a_pack.add(p * MR), MR);
        let b = std::slice::from_raw_parts(b_pack.add(p * NR), NR);

        for (row, &a_val) in acc.iter_mut().zip(a) {
            for (out, &b_val) in row.iter_mut().zip(b) {
                *out += a_val * b_val;
            }
        }
    }

    for (i, row) in acc.iter().enumerate() {
        let c_row = std::slice::from_raw_parts_mut(c.add(i * ldc), NR);
        for (dst, &v) in c_row.iter_mut().zip(row) {
            *dst += v;
        }
    }
}

/// SSE2 version: broadcast A, multiply by one B vector, add.
///
/// # Safety
///
/// Caller must ensure:
/// - `a_pack` points to `k * 4` contiguous f32 values (packed A panel)
/// - `b_pack` points to `k * 4` contiguous f32 values (packed B panel)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 4 f32s
/// - x86_64 always has SSE2, so there is no CPU check
#[cfg(target_arch = "x86_64")]
#[allow(clippy::identity_op)]
#[allow(clippy::erasing_op)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x4_sse2(
    a_pack: *const f32,
    b_pack: *const f32,
    c: *mut f32,
    k: usize,
    ldc: usize,
) {
    use std::arch::x86_64::*;

    let mut c0 = _mm_setzero_ps();
    let mut c1 = _mm_setzero_ps();
    let mut c2 = _mm_setzero_ps();
    let mut c3 = _mm_setzero_ps();

    for p in 0..k {
        let b_vec = _mm_loadu_ps(b_pack.add(p * 4));

        c0 = _mm_add_ps(c0, _mm_mul_ps(_mm_set1_ps(*a_pack.add(p * 4 + 0)), b_vec));
        c1 = _mm_add_ps(c1, _mm_mul_ps(_mm_set1_ps(*a_pack.add(p * 4 + 1)), b_vec));
        c2 = _mm_add_ps(c2, _mm_mul_ps(_mm_set1_ps(*a_pack.add(p * 4 + 2)), b_vec));
        c3 = _mm_add_ps(c3, _mm_mul_ps(_mm_set1_ps(*a_pack.add(p * 4 + 3)), b_vec));
    }

    // Read-modify-write: add the tile into whatever C already holds
    _mm_storeu_ps(c.add(0 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(0 * ldc)), c0));
    _mm_storeu_ps(c.add(1 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(1 * ldc)), c1));
    _mm_storeu_ps(c.add(2 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(2 * ldc)), c2));
    _mm_storeu_ps(c.add(3 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(3 * ldc)), c3));
}

/// SSE + FMA version: one fused multiply-add per row per depth step.
///
/// # Safety
///
/// Caller must ensure:
/// - `a_pack` points to `k * 4` contiguous f32 values (packed A panel)
/// - `b_pack` points to `k * 4` contiguous f32 values (packed B panel)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 4 f32s
/// - CPU supports FMA (checked via `#[target_feature]`)
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "fma")]
#[allow(clippy::identity_op)]
#[allow(clippy::erasing_op)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x4_fma(
    a_pack: *const f32,
    b_pack: *const f32,
    c: *mut f32,
    k: usize,
    ldc: usize,
) {
    use std::arch::x86_64::*;

    let mut c0 = _mm_setzero_ps();
    let mut c1 = _mm_setzero_ps();
    let mut c2 = _mm_setzero_ps();
    let mut c3 = _mm_setzero_ps();

    for p in 0..k {
        let b_vec = _mm_loadu_ps(b_pack.add(p * 4));

        c0 = _mm_fmadd_ps(_mm_set1_ps(*a_pack.add(p * 4 + 0)), b_vec, c0);
        c1 = _mm_fmadd_ps(_mm_set1_ps(*a_pack.add(p * 4 + 1)), b_vec, c1);
        c2 = _mm_fmadd_ps(_mm_set1_ps(*a_pack.add(p * 4 + 2)), b_vec, c2);
        c3 = _mm_fmadd_ps(_mm_set1_ps(*a_pack.add(p * 4 + 3)), b_vec, c3);
    }

    _mm_storeu_ps(c.add(0 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(0 * ldc)), c0));
    _mm_storeu_ps(c.add(1 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(1 * ldc)), c1));
    _mm_storeu_ps(c.add(2 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(2 * ldc)), c2));
    _mm_storeu_ps(c.add(3 * ldc), _mm_add_ps(_mm_loadu_ps(c.add(3 * ldc)), c3));
}

/// NEON version.
///
/// # Safety
///
/// Caller must ensure:
/// - `a_pack` points to `k * 4` contiguous f32 values (packed A panel)
/// - `b_pack` points to `k * 4` contiguous f32 values (packed B panel)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 4 f32s
/// - aarch64 always has NEON
#[cfg(target_arch = "aarch64")]
#[allow(clippy::identity_op)]
#[allow(clippy::erasing_op)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x4_neon(
    a_pack: *const f32,
    b_pack: *const f32,
    c: *mut f32,
    k: usize,
    ldc: usize,
) {
    use std::arch::aarch64::*;

    let mut c0 = vdupq_n_f32(0.0);
    let mut c1 = vdupq_n_f32(0.0);
    let mut c2 = vdupq_n_f32(0.0);
    let mut c3 = vdupq_n_f32(0.0);

    for p in 0..k {
        let b_vec = vld1q_f32(b_pack.add(p * 4));

        c0 = vfmaq_f32(c0, vdupq_n_f32(*a_pack.add(p * 4 + 0)), b_vec);
        c1 = vfmaq_f32(c1, vdupq_n_f32(*a_pack.add(p * 4 + 1)), b_vec);
        c2 = vfmaq_f32(c2, vdupq_n_f32(*a_pack.add(p * 4 + 2)), b_vec);
        c3 = vfmaq_f32(c3, vdupq_n_f32(*a_pack.add(p * 4 + 3)), b_vec);
    }

    vst1q_f32(c.add(0 * ldc), vaddq_f32(vld1q_f32(c.add(0 * ldc)), c0));
    vst1q_f32(c.add(1 * ldc), vaddq_f32(vld1q_f32(c.add(1 * ldc)), c1));
    vst1q_f32(c.add(2 * ldc), vaddq_f32(vld1q_f32(c.add(2 * ldc)), c2));
    vst1q_f32(c.add(3 * ldc), vaddq_f32(vld1q_f32(c.add(3 * ldc)), c3));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::micro_kernel;
    use crate::simd::Backend;

    fn pack(a: &[f32], b: &[f32], k: usize) -> (Vec<f32>, Vec<f32>) {
        // Pack A: for each k position, store 4 consecutive row values
        let mut a_pack = vec![0.0; k * 4];
        for p in 0..k {
            for i in 0..4 {
                a_pack[p * 4 + i] = a[i * k + p];
            }
        }
        // B with 4 columns is already packed
        (a_pack, b.to_vec())
    }

    #[test]
    fn test_kernel_4x4_correctness() {
        let k = 16;
        let a: Vec<f32> = (0..4 * k).map(|i| (i % 7) as f32).collect();
        let b: Vec<f32> = (0..k * 4).map(|i| (i % 10) as f32).collect();
        let (a_pack, b_pack) = pack(&a, &b, k);

        // Naive reference
        let mut c_expected = vec![0.0; 4 * 4];
        for i in 0..4 {
            for j in 0..4 {
                for p in 0..k {
                    c_expected[i * 4 + j] += a[i * k + p] * b[p * 4 + j];
                }
            }
        }

        for backend in Backend::available() {
            let mut c = vec![0.0; 4 * 4];
            unsafe {
                micro_kernel(backend)(a_pack.as_ptr(), b_pack.as_ptr(), c.as_mut_ptr(), k, 4);
            }

            for i in 0..16 {
                assert!(
                    (c[i] - c_expected[i]).abs() < 1e-4,
                    "{}: mismatch at {}: got {}, expected {}",
                    backend,
                    i,
                    c[i],
                    c_expected[i]
                );
            }
        }
    }

    #[test]
    fn test_kernel_accumulates_with_stride() {
        // 4 rows of a 6-wide C, tile starts at column 1
        let k = 3;
        let ldc = 6;
        let a = vec![1.0; 4 * k];
        let b = vec![2.0; k * 4];
        let (a_pack, b_pack) = pack(&a, &b, k);

        for backend in Backend::available() {
            let mut c = vec![10.0; 4 * ldc];
            unsafe {
                micro_kernel(backend)(a_pack.as_ptr(), b_pack.as_ptr(), c.as_mut_ptr().add(1), k, ldc);
            }

            for row in 0..4 {
                for col in 0..ldc {
                    let expected = if (1..5).contains(&col) { 16.0 } else { 10.0 };
                    assert_eq!(c[row * ldc + col], expected, "{} at ({}, {})", backend, row, col);
                }
            }
        }
    }

    #[test]
    fn test_kernel_zero_depth_is_noop() {
        for backend in Backend::available() {
            let mut c = vec![3.0; 16];
            unsafe {
                micro_kernel(backend)(std::ptr::null(), std::ptr::null(), c.as_mut_ptr(), 0, 4);
            }
            assert!(c.iter().all(|&x| x == 3.0), "{}", backend);
        }
    }

    #[test]
    fn test_scalar_direct() {
        let a_pack = [1.0, 2.0, 3.0, 4.0];
        let b_pack = [1.0, 10.0, 100.0, 1000.0];
        let mut c = [0.0; 16];
        unsafe { kernel_4x4_scalar(a_pack.as_ptr(), b_pack.as_ptr(), c.as_mut_ptr(), 1, 4) };
        assert_eq!(&c[12..16], &[4.0, 40.0, 400.0, 4000.0]);
    }
}
