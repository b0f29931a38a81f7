//! Dot product with four independent vector accumulators.
//!
//! Every variant has the same shape:
//! 1. main loop, 16 elements per iteration, one multiply-add into each of
//!    four accumulators so consecutive adds don't wait on each other
//! 2. the four accumulators are summed pairwise into one vector
//! 3. leftovers in steps of 4 go into that vector
//! 4. horizontal add of the 4 lanes
//! 5. the last 0-3 elements one at a time
//!
//! The summation order differs from [`dot_naive`](super::naive::dot_naive),
//! so results agree within rounding, not bit for bit.

use crate::simd::LANES;

/// Elements consumed per main-loop iteration (4 accumulators × 4 lanes).
const UNROLL: usize = 4 * LANES;

/// `(a, b) -> a · b`; see the module docs for the contract.
pub type DotKernel = unsafe fn(&[f32], &[f32]) -> f32;

/// Portable version with arrays standing in for registers.
///
/// # Safety
///
/// `a.len() == b.len()`. The body only indexes slices, so a
/// mismatch panics rather than reading out of bounds.
pub unsafe fn dot_unrolled_scalar(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len();
    let mut acc = [[0.0f32; LANES]; 4];

    let main = n - n % UNROLL;
    for (ca, cb) in a[..main].chunks_exact(UNROLL).zip(b[..main].chunks_exact(UNROLL)) {
        for (u, sum) in acc.iter_mut().enumerate() {
            for l in 0..LANES {
                sum[l] += ca[u * LANES + l] * cb[u * LANES + l];
            }
        }
    }

    let mut total = [0.0f32; LANES];
    for l in 0..LANES {
        total[l] = (acc[0][l] + acc[1][l]) + (acc[2][l] + acc[3][l]);
    }

    let quad = n - n % LANES;
    for (ca, cb) in a[main..quad].chunks_exact(LANES).zip(b[main..quad].chunks_exact(LANES)) {
        for l in 0..LANES {
            total[l] += ca[l] * cb[l];
        }
    }

    let mut sum = (total[0] + total[1]) + (total[2] + total[3]);
    for i in quad..n {
        sum += a[i] * b[i];
    }
    sum
}

/// SSE2 version.
///
/// # Safety
///
/// `a.len() == b.len()`; the loads read `b` through a raw pointer.
#[cfg(target_arch = "x86_64")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn dot_unrolled_sse2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    let n = a.len();
    let pa = a.as_ptr();
    let pb = b.as_ptr();
    let mut i = 0;

    let mut s0 = _mm_setzero_ps();
    let mut s1 = _mm_setzero_ps();
    let mut s2 = _mm_setzero_ps();
    let mut s3 = _mm_setzero_ps();

    while i + UNROLL <= n {
        s0 = _mm_add_ps(s0, _mm_mul_ps(_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i))));
        s1 = _mm_add_ps(s1, _mm_mul_ps(_mm_loadu_ps(pa.add(i + 4)), _mm_loadu_ps(pb.add(i + 4))));
        s2 = _mm_add_ps(s2, _mm_mul_ps(_mm_loadu_ps(pa.add(i + 8)), _mm_loadu_ps(pb.add(i + 8))));
        s3 = _mm_add_ps(s3, _mm_mul_ps(_mm_loadu_ps(pa.add(i + 12)), _mm_loadu_ps(pb.add(i + 12))));
        i += UNROLL;
    }

    let mut total = _mm_add_ps(_mm_add_ps(s0, s1), _mm_add_ps(s2, s3));

    while i + LANES <= n {
        total = _mm_add_ps(total, _mm_mul_ps(_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i))));
        i += LANES;
    }

    let mut sum = hsum_sse(total);
    while i < n {
        sum += a[i] * b[i];
        i += 1;
    }
    sum
}

/// SSE + FMA version.
///
/// # Safety
///
/// `a.len() == b.len()` and the CPU supports FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "fma")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn dot_unrolled_fma(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    let n = a.len();
    let pa = a.as_ptr();
    let pb = b.as_ptr();
    let mut i = 0;

    let mut s0 = _mm_setzero_ps();
    let mut s1 = _mm_setzero_ps();
    let mut s2 = _mm_setzero_ps();
    let mut s3 = _mm_setzero_ps();

    while i + UNROLL <= n {
        s0 = _mm_fmadd_ps(_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i)), s0);
        s1 = _mm_fmadd_ps(_mm_loadu_ps(pa.add(i + 4)), _mm_loadu_ps(pb.add(i + 4)), s1);
        s2 = _mm_fmadd_ps(_mm_loadu_ps(pa.add(i + 8)), _mm_loadu_ps(pb.add(i + 8)), s2);
        s3 = _mm_fmadd_ps(_mm_loadu_ps(pa.add(i + 12)), _mm_loadu_ps(pb.add(i + 12)), s3);
        i += UNROLL;
    }

    let mut total = _mm_add_ps(_mm_add_ps(s0, s1), _mm_add_ps(s2, s3));

    while i + LANES <= n {
        total = _mm_fmadd_ps(_mm_loadu_ps(pa.add(i)), _mm_loadu_ps(pb.add(i)), total);
        i += LANES;
    }

    let mut sum = hsum_sse(total);
    while i < n {
        sum += a[i] * b[i];
        i += 1;
    }
    sum
}

/// Horizontal sum of the 4 lanes.
#[cfg(target_arch = "x86_64")]
#[inline]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn hsum_sse(v: std::arch::x86_64::__m128) -> f32 {
    use std::arch::x86_64::*;

    // [v0+v2, v1+v3, ..]
    let pairs = _mm_add_ps(v, _mm_movehl_ps(v, v));
    let lane1 = _mm_shuffle_ps(pairs, pairs, 0x55);
    _mm_cvtss_f32(_mm_add_ss(pairs, lane1))
}

/// NEON version.
///
/// # Safety
///
/// `a.len() == b.len()`; the loads read `b` through a raw pointer.
#[cfg(target_arch = "aarch64")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn dot_unrolled_neon(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::aarch64::*;

    let n = a.len();
    let pa = a.as_ptr();
    let pb = b.as_ptr();
    let mut i = 0;

    let mut s0 = vdupq_n_f32(0.0);
    let mut s1 = vdupq_n_f32(0.0);
    let mut s2 = vdupq_n_f32(0.0);
    let mut s3 = vdupq_n_f32(0.0);

    while i + UNROLL <= n {
        s0 = vfmaq_f32(s0, vld1q_f32(pa.add(i)), vld1q_f32(pb.add(i)));
        s1 = vfmaq_f32(s1, vld1q_f32(pa.add(i + 4)), vld1q_f32(pb.add(i + 4)));
        s2 = vfmaq_f32(s2, vld1q_f32(pa.add(i + 8)), vld1q_f32(pb.add(i + 8)));
        s3 = vfmaq_f32(s3, vld1q_f32(pa.add(i + 12)), vld1q_f32(pb.add(i + 12)));
        i += UNROLL;
    }

    let mut total = vaddq_f32(vaddq_f32(s0, s1), vaddq_f32(s2, s3));

    while i + LANES <= n {
        total = vfmaq_f32(total, vld1q_f32(pa.add(i)), vld1q_f32(pb.add(i)));
        i += LANES;
    }

    let mut sum = vaddvq_f32(total);
    while i < n {
        sum += a[i] * b[i];
        i += 1;
    }
    sum
}
